use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use cfdns::client::Auth;
use cfdns::error::Result;

#[derive(Debug, Clone, Deserialize)]
pub struct Cfg {
    pub authentication: Auth,
}

pub struct Parser;

impl Parser {
    pub fn parse_yaml<P: AsRef<Path>>(path: P) -> Result<Cfg> {
        let reader = Self::file_reader(path)?;
        let config: Cfg = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    fn file_reader<P: AsRef<Path>>(path: P) -> Result<BufReader<File>> {
        let f = std::fs::File::open(path)?;
        Ok(BufReader::new(f))
    }
}

////////////////////////////////////////////////////////////
// Unit test
////////////////////////////////////////////////////////////
#[cfg(test)]
#[path = "config_test.rs"]
mod test;
