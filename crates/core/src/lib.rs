pub mod archive;
pub mod batch;
pub mod compositor;
pub mod config;
pub mod metrics;
pub mod progress;
pub mod qr;
pub mod render;
pub mod template;
pub mod testing;
pub mod zone;

pub use archive::{ArchiveEntry, ArchiveError, ArchiveWriter};
pub use batch::{BatchController, BatchError, BatchResult, FailureRecord};
pub use compositor::{CompositionError, Compositor, OutputFormat, Overlay};
pub use config::{
    load_config, load_config_from_str, validate_config, BatchConfig, Config, ConfigError,
    CounterConfig, ProgressConfig, SanitizedConfig, ServerConfig, TemplatesConfig, TicketConfig,
};
pub use progress::{
    Clock, ProgressError, ProgressPatch, ProgressSnapshot, ProgressStore, ProgressView,
    SystemClock,
};
pub use qr::{Color, QrEncoder, QrError, QrStyle};
pub use render::{ErrorKind, RenderError, Renderer, TicketDescriptor, TicketRenderer};
pub use template::{TemplateError, TemplateStore};
pub use zone::ZoneResolver;
