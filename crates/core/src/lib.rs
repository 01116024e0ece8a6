pub mod archive;
pub mod batch;
pub mod capabilities;
pub mod config;
pub mod convert;
pub mod metrics;
pub mod status;
pub mod testing;
pub mod tool;

pub use archive::{clean_stem, ArchiveError, ArchiveRepackager, ExtractionReport};
pub use batch::{
    BatchError, BatchOutput, BatchResult, BatchRunner, ConversionRequest, FailedEntry,
    OutputEntry,
};
pub use capabilities::{Domain, UnsupportedFormat};
pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError, SanitizedConfig,
};
pub use convert::{ConversionStep, ConvertError};
pub use status::{create_status_channel, ItemStatus, StatusEnvelope, StatusEvent, StatusSender};
pub use tool::{ProcessToolRunner, ToolError, ToolInvocation, ToolRunner};
