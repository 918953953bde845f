mod restful_cli;

pub use restful_cli::Auth;
pub use restful_cli::CfRecord;
pub use restful_cli::CfZone;
pub use restful_cli::Cli;
