use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::compositor::OutputFormat;
use crate::qr::Color;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub templates: TemplatesConfig,
    #[serde(default)]
    pub ticket: TicketConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Where templates live and which zone uses which file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TemplatesConfig {
    /// Directory holding the template images.
    #[serde(default = "default_template_dir")]
    pub dir: PathBuf,
    /// Keep template bytes in memory after the first read.
    #[serde(default = "default_true")]
    pub cache: bool,
    /// Zone label -> template file name. Matched case-sensitively after trimming.
    #[serde(default)]
    pub zones: HashMap<String, String>,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: default_template_dir(),
            cache: true,
            zones: HashMap::new(),
        }
    }
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_true() -> bool {
    true
}

/// Per-ticket rendering parameters.
///
/// Read-only for a batch; single-ticket requests may override the QR
/// geometry and quality.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TicketConfig {
    /// Template used when a ticket has no zone or an unmapped one.
    #[serde(default = "default_template_id")]
    pub template_id: String,
    /// Edge length of the QR code in pixels.
    #[serde(default = "default_qr_size")]
    pub qr_size: u32,
    /// Left offset of the QR code on the template.
    #[serde(default = "default_qr_x")]
    pub qr_x: i64,
    /// Top offset of the QR code on the template.
    #[serde(default = "default_qr_y")]
    pub qr_y: i64,
    #[serde(default = "default_qr_dark")]
    pub qr_dark: Color,
    #[serde(default = "default_qr_light")]
    pub qr_light: Color,
    /// Quiet zone around the code, in modules.
    #[serde(default = "default_qr_margin")]
    pub qr_margin: u32,
    /// Output quality 1-100, clamped before use.
    #[serde(default = "default_quality")]
    pub quality: u8,
    /// Quality used for inline previews.
    #[serde(default = "default_preview_quality")]
    pub preview_quality: u8,
    #[serde(default)]
    pub format: OutputFormat,
    /// Pixels an overlay may overhang the canvas before a warning is logged.
    #[serde(default)]
    pub overlay_tolerance: u32,
    /// Optional sequence-number badge.
    #[serde(default)]
    pub counter: Option<CounterConfig>,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            template_id: default_template_id(),
            qr_size: default_qr_size(),
            qr_x: default_qr_x(),
            qr_y: default_qr_y(),
            qr_dark: default_qr_dark(),
            qr_light: default_qr_light(),
            qr_margin: default_qr_margin(),
            quality: default_quality(),
            preview_quality: default_preview_quality(),
            format: OutputFormat::default(),
            overlay_tolerance: 0,
            counter: None,
        }
    }
}

impl TicketConfig {
    /// Overrides the QR size.
    pub fn with_qr_size(mut self, size: u32) -> Self {
        self.qr_size = size;
        self
    }

    /// Overrides the QR position.
    pub fn with_qr_position(mut self, x: i64, y: i64) -> Self {
        self.qr_x = x;
        self.qr_y = y;
        self
    }

    /// Overrides the output quality.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Overrides the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }
}

fn default_template_id() -> String {
    "ticket.jpg".to_string()
}

fn default_qr_size() -> u32 {
    2400
}

fn default_qr_x() -> i64 {
    9850
}

fn default_qr_y() -> i64 {
    2950
}

fn default_qr_dark() -> Color {
    Color::BLACK
}

fn default_qr_light() -> Color {
    Color::WHITE
}

fn default_qr_margin() -> u32 {
    1
}

fn default_quality() -> u8 {
    90
}

fn default_preview_quality() -> u8 {
    70
}

/// Sequence-number badge painted under the QR code.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CounterConfig {
    #[serde(default = "default_counter_offset")]
    pub x: i64,
    #[serde(default = "default_counter_offset")]
    pub y: i64,
    /// Height of a digit in pixels.
    #[serde(default = "default_digit_height")]
    pub digit_height: u32,
    #[serde(default = "default_qr_dark")]
    pub color: Color,
    /// 0.0 (invisible) to 1.0 (opaque).
    #[serde(default = "default_counter_opacity")]
    pub opacity: f32,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            x: default_counter_offset(),
            y: default_counter_offset(),
            digit_height: default_digit_height(),
            color: default_qr_dark(),
            opacity: default_counter_opacity(),
        }
    }
}

fn default_counter_offset() -> i64 {
    80
}

fn default_digit_height() -> u32 {
    140
}

fn default_counter_opacity() -> f32 {
    0.12
}

/// Batch controller tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchConfig {
    /// Tickets rendered concurrently per wave.
    #[serde(default = "default_wave_size")]
    pub wave_size: usize,
    /// Pause between waves in milliseconds.
    #[serde(default = "default_wave_cooldown")]
    pub wave_cooldown_ms: u64,
    /// Per-ticket render timeout in seconds.
    #[serde(default = "default_ticket_timeout")]
    pub ticket_timeout_secs: u64,
    /// Deflate level 0-9.
    #[serde(default = "default_compression_level")]
    pub compression_level: u8,
    /// Failure messages longer than this are truncated.
    #[serde(default = "default_max_error_len")]
    pub max_error_len: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            wave_size: default_wave_size(),
            wave_cooldown_ms: default_wave_cooldown(),
            ticket_timeout_secs: default_ticket_timeout(),
            compression_level: default_compression_level(),
            max_error_len: default_max_error_len(),
        }
    }
}

impl BatchConfig {
    /// Sets the wave size.
    pub fn with_wave_size(mut self, size: usize) -> Self {
        self.wave_size = size;
        self
    }

    /// Sets the cooldown between waves.
    pub fn with_cooldown_ms(mut self, ms: u64) -> Self {
        self.wave_cooldown_ms = ms;
        self
    }

    /// Sets the per-ticket timeout.
    pub fn with_ticket_timeout_secs(mut self, secs: u64) -> Self {
        self.ticket_timeout_secs = secs;
        self
    }
}

fn default_wave_size() -> usize {
    2
}

fn default_wave_cooldown() -> u64 {
    100
}

fn default_ticket_timeout() -> u64 {
    30
}

fn default_compression_level() -> u8 {
    6
}

fn default_max_error_len() -> usize {
    200
}

/// Progress store expiry rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProgressConfig {
    /// Completed sessions are dropped after this many idle seconds.
    #[serde(default = "default_completed_ttl")]
    pub completed_ttl_secs: u64,
    /// Any session is dropped after this many idle seconds.
    #[serde(default = "default_abandoned_ttl")]
    pub abandoned_ttl_secs: u64,
    /// Background sweep period.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            completed_ttl_secs: default_completed_ttl(),
            abandoned_ttl_secs: default_abandoned_ttl(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_completed_ttl() -> u64 {
    5 * 60
}

fn default_abandoned_ttl() -> u64 {
    60 * 60
}

fn default_sweep_interval() -> u64 {
    60
}

/// Sanitized config for API responses (zone map reduced to labels)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub templates: SanitizedTemplatesConfig,
    pub ticket: TicketConfig,
    pub batch: BatchConfig,
    pub progress: ProgressConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTemplatesConfig {
    pub cache: bool,
    pub zones: Vec<String>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let mut zones: Vec<String> = config.templates.zones.keys().cloned().collect();
        zones.sort();
        Self {
            server: config.server.clone(),
            templates: SanitizedTemplatesConfig {
                cache: config.templates.cache,
                zones,
            },
            ticket: config.ticket.clone(),
            batch: config.batch.clone(),
            progress: config.progress.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.ticket.template_id, "ticket.jpg");
        assert_eq!(config.ticket.qr_size, 2400);
        assert_eq!(config.ticket.qr_margin, 1);
        assert_eq!(config.batch.wave_size, 2);
        assert_eq!(config.batch.wave_cooldown_ms, 100);
        assert_eq!(config.progress.completed_ttl_secs, 300);
        assert_eq!(config.progress.abandoned_ttl_secs, 3600);
        assert!(config.ticket.counter.is_none());
    }

    #[test]
    fn test_deserialize_zone_map() {
        let toml = r#"
[templates]
dir = "/srv/templates"

[templates.zones]
"Khát Vọng" = "ticket_KV.jpg"
"Đại Ngàn" = "ticket_DN.jpg"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.templates.dir, PathBuf::from("/srv/templates"));
        assert_eq!(config.templates.zones.len(), 2);
        assert_eq!(config.templates.zones["Khát Vọng"], "ticket_KV.jpg");
    }

    #[test]
    fn test_deserialize_ticket_section() {
        let toml = r##"
[ticket]
qr_size = 800
qr_x = 100
qr_y = 200
qr_dark = "#FF0000"
format = "png"

[ticket.counter]
digit_height = 60
"##;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.ticket.qr_size, 800);
        assert_eq!(config.ticket.qr_dark, Color::new(255, 0, 0));
        assert_eq!(config.ticket.format, OutputFormat::Png);
        let counter = config.ticket.counter.unwrap();
        assert_eq!(counter.digit_height, 60);
        assert_eq!(counter.x, 80);
    }

    #[test]
    fn test_deserialize_bad_color_fails() {
        let toml = r#"
[ticket]
qr_dark = "black"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config_lists_zone_labels() {
        let mut config = Config::default();
        config
            .templates
            .zones
            .insert("VIP".to_string(), "vip.jpg".to_string());
        config
            .templates
            .zones
            .insert("GA".to_string(), "ga.jpg".to_string());

        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.templates.zones, vec!["GA", "VIP"]);
        assert_eq!(sanitized.server.port, 8080);
    }

    #[test]
    fn test_ticket_config_builder() {
        let config = TicketConfig::default()
            .with_qr_size(300)
            .with_qr_position(10, 20)
            .with_quality(50)
            .with_format(OutputFormat::Png);
        assert_eq!(config.qr_size, 300);
        assert_eq!((config.qr_x, config.qr_y), (10, 20));
        assert_eq!(config.quality, 50);
        assert_eq!(config.format, OutputFormat::Png);
    }
}
