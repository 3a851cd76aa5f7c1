//! Zone to template resolution.
//!
//! Zone labels are matched case-sensitively after trimming surrounding
//! whitespace. Anything unmapped, blank or absent falls back to the default
//! template; resolution never fails.

use std::collections::HashMap;

/// Resolves a ticket's zone label to a template id.
pub fn resolve<'a>(
    zone: Option<&str>,
    mapping: &'a HashMap<String, String>,
    default_template_id: &'a str,
) -> &'a str {
    zone.map(str::trim)
        .filter(|z| !z.is_empty())
        .and_then(|z| mapping.get(z))
        .map(String::as_str)
        .unwrap_or(default_template_id)
}

/// Owns a zone mapping so every call site resolves the same way.
#[derive(Debug, Clone, Default)]
pub struct ZoneResolver {
    mapping: HashMap<String, String>,
}

impl ZoneResolver {
    /// Builds a resolver. Keys are trimmed so config whitespace can't cause silent misses.
    pub fn new(mapping: HashMap<String, String>) -> Self {
        let mapping = mapping
            .into_iter()
            .map(|(zone, template)| (zone.trim().to_string(), template))
            .collect();
        Self { mapping }
    }

    pub fn resolve<'a>(&'a self, zone: Option<&str>, default_template_id: &'a str) -> &'a str {
        resolve(zone, &self.mapping, default_template_id)
    }

    /// Distinct template ids referenced by the mapping.
    pub fn templates(&self) -> Vec<&str> {
        let mut templates: Vec<&str> = self.mapping.values().map(String::as_str).collect();
        templates.sort_unstable();
        templates.dedup();
        templates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> HashMap<String, String> {
        HashMap::from([
            ("Khát Vọng".to_string(), "ticket_KV.jpg".to_string()),
            ("Đại Ngàn".to_string(), "ticket_DN.jpg".to_string()),
        ])
    }

    #[test]
    fn test_mapped_zone() {
        let map = mapping();
        assert_eq!(resolve(Some("Khát Vọng"), &map, "ticket.jpg"), "ticket_KV.jpg");
    }

    #[test]
    fn test_zone_is_trimmed() {
        let map = mapping();
        assert_eq!(
            resolve(Some("  Đại Ngàn \t"), &map, "ticket.jpg"),
            "ticket_DN.jpg"
        );
    }

    #[test]
    fn test_zone_is_case_sensitive() {
        let map = mapping();
        assert_eq!(resolve(Some("khát vọng"), &map, "ticket.jpg"), "ticket.jpg");
    }

    #[test]
    fn test_unmapped_zone_falls_back() {
        let map = mapping();
        assert_eq!(resolve(Some("VIP"), &map, "ticket.jpg"), "ticket.jpg");
    }

    #[test]
    fn test_absent_or_blank_zone_falls_back() {
        let map = mapping();
        assert_eq!(resolve(None, &map, "ticket.jpg"), "ticket.jpg");
        assert_eq!(resolve(Some("   "), &map, "ticket.jpg"), "ticket.jpg");
    }

    #[test]
    fn test_resolver_trims_config_keys() {
        let resolver = ZoneResolver::new(HashMap::from([(
            " VIP ".to_string(),
            "vip.jpg".to_string(),
        )]));
        assert_eq!(resolver.resolve(Some("VIP"), "ticket.jpg"), "vip.jpg");
        assert_eq!(resolver.templates(), vec!["vip.jpg"]);
    }
}
