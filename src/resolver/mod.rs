//! Cross-referencing of template placeholders against supplied values.

use std::collections::HashMap;

use log::{debug, trace};

use crate::{
    filler::{Filler, FILLER_LEN},
    placeholder::placeholders,
    template::Template,
};

/// Resolve every placeholder referenced by `template` to a value.
///
/// The template level `provider_name`, `service_name` and `logo` are always scanned, records only if they
/// belong to `group_id`. An empty `group_id` selects every record, a non-empty one excludes ungrouped records.
/// A name found in `kvs` takes the supplied value, any other name gets a single generated value from `filler`,
/// no matter how often it appears.
pub fn cross_reference(
    template: &Template,
    kvs: &HashMap<String, String>,
    group_id: &str,
    filler: &dyn Filler,
) -> HashMap<String, String> {
    debug!("Cross referencing template variables");
    let mut resolved: HashMap<String, String> = HashMap::new();

    let template_fields = [
        template.provider_name.as_str(),
        template.service_name.as_str(),
        template.logo.as_str(),
    ];
    let record_fields = template
        .records
        .iter()
        .filter(|r| r.in_group(group_id))
        .flat_map(|r| r.placeholder_fields());

    for field in template_fields.into_iter().chain(record_fields) {
        trace!("Scanning {:?}", field);
        // "%%" yields an empty name, which can never be supplied on the command line
        for name in placeholders(field).filter(|n| !n.is_empty()) {
            if resolved.contains_key(name) {
                continue;
            }
            let value = match kvs.get(name) {
                Some(v) => v.to_owned(),
                None => {
                    let v = filler.fill(FILLER_LEN);
                    debug!("No value supplied for {}, generated {}", name, v);
                    v
                }
            };
            resolved.insert(name.to_owned(), value);
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::*;
    use crate::{
        filler::{MockFiller, RandomFiller},
        template::Record,
    };

    fn template() -> Template {
        Template {
            provider_id: "p1".to_owned(),
            service_id: "s1".to_owned(),
            provider_name: "Acme%region%".to_owned(),
            service_name: "Mail for %domain%".to_owned(),
            logo: "https://%cdn%/logo.png".to_owned(),
            version: 1,
            records: vec![
                Record {
                    record_type: "A".to_owned(),
                    host: "%host%".to_owned(),
                    points_to: "%ip%".to_owned(),
                    ..Default::default()
                },
                Record {
                    record_type: "TXT".to_owned(),
                    host: "%host%".to_owned(),
                    data: "verify=%token%".to_owned(),
                    group_id: "verify".to_owned(),
                    ..Default::default()
                },
                Record {
                    record_type: "SRV".to_owned(),
                    name: "%srvname%".to_owned(),
                    service: "%srvservice%".to_owned(),
                    target: "%srvtarget%".to_owned(),
                    spf_rules: "%spf%".to_owned(),
                    group_id: "sip".to_owned(),
                    ..Default::default()
                },
            ],
        }
    }

    fn kvs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn keys(map: &HashMap<String, String>) -> Vec<&str> {
        let mut k: Vec<&str> = map.keys().map(String::as_str).collect();
        k.sort_unstable();
        k
    }

    #[test]
    fn should_resolve_every_field_without_group_filter() {
        let resolved = cross_reference(&template(), &HashMap::new(), "", &RandomFiller);
        assert_eq!(
            keys(&resolved),
            vec![
                "cdn",
                "domain",
                "host",
                "ip",
                "region",
                "spf",
                "srvname",
                "srvservice",
                "srvtarget",
                "token"
            ]
        );
        for v in resolved.values() {
            assert_eq!(v.len(), FILLER_LEN);
            assert!(v.chars().all(|c| c.is_ascii_alphabetic()));
        }
    }

    #[test]
    fn should_prefer_supplied_values() {
        let supplied = kvs(&[("ip", "192.0.2.1"), ("region", "eu"), ("unused", "x")]);
        let resolved = cross_reference(&template(), &supplied, "", &RandomFiller);
        assert_eq!(resolved["ip"], "192.0.2.1");
        assert_eq!(resolved["region"], "eu");
        assert!(!resolved.contains_key("unused"));
    }

    #[test]
    fn should_only_scan_selected_group() {
        let resolved = cross_reference(&template(), &HashMap::new(), "verify", &RandomFiller);
        assert_eq!(
            keys(&resolved),
            vec!["cdn", "domain", "host", "region", "token"]
        );
    }

    #[test]
    fn should_keep_template_fields_for_unknown_group() {
        let resolved = cross_reference(&template(), &HashMap::new(), "nope", &RandomFiller);
        assert_eq!(keys(&resolved), vec!["cdn", "domain", "region"]);
    }

    #[test]
    fn should_generate_once_per_name() {
        // "host" is referenced by two records but must only be generated once
        let mut filler = MockFiller::new();
        let mut counter = 0;
        filler
            .expect_fill()
            .with(eq(FILLER_LEN))
            .times(9)
            .returning(move |_| {
                counter += 1;
                format!("fill{:04}", counter)
            });
        let resolved = cross_reference(&template(), &kvs(&[("ip", "192.0.2.1")]), "", &filler);
        assert_eq!(resolved.len(), 10);
        assert_eq!(resolved["ip"], "192.0.2.1");
    }

    #[test]
    fn should_not_generate_for_supplied_names() {
        let mut filler = MockFiller::new();
        filler.expect_fill().never();
        let t = Template {
            provider_name: "%a%%b%".to_owned(),
            records: vec![Record {
                host: "%a%".to_owned(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let resolved = cross_reference(&t, &kvs(&[("a", "1"), ("b", "2")]), "", &filler);
        assert_eq!(resolved, kvs(&[("a", "1"), ("b", "2")]));
    }

    #[test]
    fn should_skip_empty_names_and_dangling_text() {
        let mut filler = MockFiller::new();
        filler.expect_fill().never();
        let t = Template {
            provider_name: "100%% sure".to_owned(),
            service_name: "50%off".to_owned(),
            ..Default::default()
        };
        assert!(cross_reference(&t, &HashMap::new(), "", &filler).is_empty());
    }

    #[test]
    fn should_not_modify_inputs() {
        let t = template();
        let supplied = kvs(&[("ip", "192.0.2.1")]);
        let _ = cross_reference(&t, &supplied, "", &RandomFiller);
        assert_eq!(t, template());
        assert_eq!(supplied, kvs(&[("ip", "192.0.2.1")]));
    }
}
