use reqwest::Method;
use serde::{Deserialize, Serialize};

const DEFAULT_RETRY_DELAY_MS: u64 = 250;

/// HTTP methods retried on 5xx responses when no explicit set is configured.
///
/// POST and PATCH are deliberately absent: re-issuing them against a standby
/// gateway could duplicate side effects.
pub fn default_safe_methods() -> Vec<Method> {
    vec![
        Method::GET,
        Method::HEAD,
        Method::OPTIONS,
        Method::PUT,
        Method::DELETE,
    ]
}

fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

/// Failover defaults supplied when constructing a
/// [`FailoverClient`](crate::FailoverClient).
///
/// Any field can be overridden for a single request through
/// [`GatewayOverrides`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOptions {
    /// Primary endpoint requests are expected to target.
    pub main_gateway: String,
    /// Alternate endpoints substituted in on retry, tried in list order.
    #[serde(default)]
    pub standby_gateway: Vec<String>,
    /// Methods considered safe to retry after a server error.
    #[serde(
        default = "default_safe_methods",
        serialize_with = "methods::serialize",
        deserialize_with = "methods::deserialize"
    )]
    pub safe_methods: Vec<Method>,
    /// Delay in milliseconds before each resubmission.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl GatewayOptions {
    /// Creates options for a main gateway and its standby list.
    pub fn new<I, S>(main_gateway: impl Into<String>, standby_gateway: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            main_gateway: main_gateway.into(),
            standby_gateway: standby_gateway.into_iter().map(Into::into).collect(),
            safe_methods: default_safe_methods(),
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }

    /// Replaces the set of methods eligible for server-error retry.
    pub fn with_safe_methods(mut self, methods: impl Into<Vec<Method>>) -> Self {
        self.safe_methods = methods.into();
        self
    }

    /// Sets the delay before each resubmission.
    pub fn with_retry_delay_ms(mut self, delay_ms: u64) -> Self {
        self.retry_delay_ms = delay_ms;
        self
    }

    /// Merges per-request overrides over these defaults and prunes the main
    /// gateway out of the standby list. Every occurrence is removed, so a
    /// gateway can never be offered as its own standby regardless of where
    /// it appears in the list.
    pub(crate) fn resolve(&self, overrides: Option<&GatewayOverrides>) -> GatewayOptions {
        let mut resolved = self.clone();
        if let Some(overrides) = overrides {
            if let Some(main_gateway) = &overrides.main_gateway {
                resolved.main_gateway = main_gateway.clone();
            }
            if let Some(standby_gateway) = &overrides.standby_gateway {
                resolved.standby_gateway = standby_gateway.clone();
            }
            if let Some(safe_methods) = &overrides.safe_methods {
                resolved.safe_methods = safe_methods.clone();
            }
            if let Some(retry_delay_ms) = overrides.retry_delay_ms {
                resolved.retry_delay_ms = retry_delay_ms;
            }
        }
        let main_gateway = resolved.main_gateway.clone();
        resolved.standby_gateway.retain(|gateway| *gateway != main_gateway);
        resolved
    }
}

/// Per-request overrides attached to a single
/// [`RequestConfig`](crate::RequestConfig).
///
/// Fields left as `None` fall back to the client-wide [`GatewayOptions`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOverrides {
    /// Overrides the expected primary endpoint.
    #[serde(default)]
    pub main_gateway: Option<String>,
    /// Overrides the standby list.
    #[serde(default)]
    pub standby_gateway: Option<Vec<String>>,
    /// Overrides the safe-method set.
    #[serde(
        default,
        serialize_with = "methods::serialize_opt",
        deserialize_with = "methods::deserialize_opt"
    )]
    pub safe_methods: Option<Vec<Method>>,
    /// Overrides the resubmission delay.
    #[serde(default)]
    pub retry_delay_ms: Option<u64>,
}

impl GatewayOverrides {
    /// Overrides the standby list for one request.
    pub fn standby_gateway<I, S>(mut self, standby_gateway: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.standby_gateway = Some(standby_gateway.into_iter().map(Into::into).collect());
        self
    }

    /// Overrides the expected main gateway for one request.
    pub fn main_gateway(mut self, main_gateway: impl Into<String>) -> Self {
        self.main_gateway = Some(main_gateway.into());
        self
    }

    /// Overrides the safe-method set for one request.
    pub fn safe_methods(mut self, methods: impl Into<Vec<Method>>) -> Self {
        self.safe_methods = Some(methods.into());
        self
    }

    /// Overrides the resubmission delay for one request.
    pub fn retry_delay_ms(mut self, delay_ms: u64) -> Self {
        self.retry_delay_ms = Some(delay_ms);
        self
    }
}

/// Serde bridge for `reqwest::Method`, which has no serde support of its own.
/// Methods are represented as their uppercase token strings.
mod methods {
    use reqwest::Method;
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(methods: &[Method], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(methods.iter().map(Method::as_str))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Method>, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        raw.iter()
            .map(|name| {
                Method::from_bytes(name.to_ascii_uppercase().as_bytes())
                    .map_err(|_| D::Error::custom(format!("invalid HTTP method '{name}'")))
            })
            .collect()
    }

    pub fn serialize_opt<S: Serializer>(
        methods: &Option<Vec<Method>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match methods {
            Some(methods) => serialize(methods, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize_opt<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<Method>>, D::Error> {
        let raw = Option::<Vec<String>>::deserialize(deserializer)?;
        raw.map(|names| {
            names
                .iter()
                .map(|name| {
                    Method::from_bytes(name.to_ascii_uppercase().as_bytes())
                        .map_err(|_| D::Error::custom(format!("invalid HTTP method '{name}'")))
                })
                .collect()
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Method;

    use super::{GatewayOptions, GatewayOverrides};

    #[test]
    fn defaults_exclude_post() {
        let options = GatewayOptions::new("https://a.example", ["https://b.example"]);
        assert!(options.safe_methods.contains(&Method::GET));
        assert!(!options.safe_methods.contains(&Method::POST));
        assert_eq!(options.retry_delay_ms, 250);
    }

    #[test]
    fn overrides_take_precedence() {
        let defaults = GatewayOptions::new("https://a.example", ["https://b.example"])
            .with_retry_delay_ms(500);
        let overrides = GatewayOverrides::default()
            .standby_gateway(["https://x.example"])
            .retry_delay_ms(25);

        let resolved = defaults.resolve(Some(&overrides));
        assert_eq!(resolved.standby_gateway, vec!["https://x.example"]);
        assert_eq!(resolved.retry_delay_ms, 25);
        assert_eq!(resolved.main_gateway, "https://a.example");
    }

    #[test]
    fn resolve_prunes_main_from_standby_at_any_index() {
        // Index 0 in particular: the pruning must not depend on the position
        // of the match being truthy.
        let options = GatewayOptions::new(
            "https://a.example",
            ["https://a.example", "https://b.example", "https://a.example"],
        );
        let resolved = options.resolve(None);
        assert_eq!(resolved.standby_gateway, vec!["https://b.example"]);
    }

    #[test]
    fn resolve_keeps_duplicate_standbys() {
        let options = GatewayOptions::new(
            "https://a.example",
            ["https://b.example", "https://b.example"],
        );
        let resolved = options.resolve(None);
        assert_eq!(resolved.standby_gateway.len(), 2);
    }

    #[test]
    fn options_deserialize_from_json() {
        let options: GatewayOptions = serde_json::from_str(
            r#"{
                "main_gateway": "https://a.example",
                "standby_gateway": ["https://b.example"],
                "safe_methods": ["get", "head"],
                "retry_delay_ms": 100
            }"#,
        )
        .expect("options must deserialize");
        assert_eq!(options.safe_methods, vec![Method::GET, Method::HEAD]);
        assert_eq!(options.retry_delay_ms, 100);
    }

    #[test]
    fn options_deserialize_fills_defaults() {
        let options: GatewayOptions =
            serde_json::from_str(r#"{"main_gateway": "https://a.example"}"#)
                .expect("options must deserialize");
        assert!(options.standby_gateway.is_empty());
        assert!(options.safe_methods.contains(&Method::DELETE));
    }
}
