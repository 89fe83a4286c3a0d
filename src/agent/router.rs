//! Keyword router: picks an agent for free text when the caller names none.
//!
//! Routes are tested in declaration order and the first agent with any
//! trigger contained in the lower-cased query wins. There is no scoring;
//! an earlier route shadows a later one whose triggers also appear.

use tracing::debug;

/// Agent returned when no trigger matches.
pub const DEFAULT_AGENT: &str = "nlp_analyzer";

/// Built-in route table (Traditional Chinese and English triggers).
const BUILTIN_ROUTES: &[(&str, &[&str])] = &[
    ("nlp_analyzer", &["分析", "文字", "analyze", "text", "nlp", "實體"]),
    ("anomaly_detector", &["異常", "anomaly", "偵測", "detect", "檢測"]),
    ("duplicate_checker", &["重複", "duplicate", "相似", "similar"]),
    ("label_matcher", &["標籤", "label", "比對", "match", "ocr"]),
    ("data_standardizer", &["標準化", "standardize", "正規化", "normalize"]),
    ("adverse_event_linker", &["不良事件", "adverse", "連結", "link"]),
    ("recall_manager", &["回收", "recall", "追蹤", "track"]),
    ("eifu_manager", &["說明書", "eifu", "instructions"]),
    ("customs_verifier", &["海關", "customs", "查驗", "verify"]),
    ("international_connector", &["國際", "international", "同步", "sync"]),
];

/// One agent's trigger list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Agent selected by this route.
    pub agent: String,
    /// Lower-case trigger substrings.
    pub triggers: Vec<String>,
}

/// Ordered keyword router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Router {
    routes: Vec<Route>,
    default_agent: String,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(
            BUILTIN_ROUTES
                .iter()
                .map(|&(agent, triggers)| (agent, triggers.iter().copied())),
            DEFAULT_AGENT,
        )
    }
}

impl Router {
    /// Builds a router from `(agent, triggers)` pairs in precedence order.
    /// Triggers are lower-cased so matching is case-insensitive.
    pub fn new<A, T, S>(routes: impl IntoIterator<Item = (A, T)>, default_agent: &str) -> Self
    where
        A: Into<String>,
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            routes: routes
                .into_iter()
                .map(|(agent, triggers)| Route {
                    agent: agent.into(),
                    triggers: triggers
                        .into_iter()
                        .map(|t| t.as_ref().to_lowercase())
                        .filter(|t| !t.is_empty())
                        .collect(),
                })
                .collect(),
            default_agent: default_agent.to_string(),
        }
    }

    /// Selects the agent for `query`.
    #[must_use]
    pub fn route(&self, query: &str) -> &str {
        let lowered = query.to_lowercase();
        for route in &self.routes {
            if let Some(trigger) = route.triggers.iter().find(|t| lowered.contains(t.as_str())) {
                debug!(agent = %route.agent, %trigger, "routed query");
                return &route.agent;
            }
        }
        debug!(agent = %self.default_agent, "no trigger matched, using default agent");
        &self.default_agent
    }

    /// Routes in precedence order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Agent used when nothing matches.
    #[must_use]
    pub fn default_agent(&self) -> &str {
        &self.default_agent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case("請分析這筆資料", "nlp_analyzer"; "chinese analyze")]
    #[test_case("find ANOMALY in batch 7", "anomaly_detector"; "uppercase english")]
    #[test_case("這兩筆是否重複", "duplicate_checker"; "duplicate zh")]
    #[test_case("run ocr on the photo", "label_matcher"; "ocr")]
    #[test_case("please standardize units", "data_standardizer"; "standardize")]
    #[test_case("adverse reports for pumps", "adverse_event_linker"; "adverse")]
    #[test_case("產品回收狀態", "recall_manager"; "recall zh")]
    #[test_case("where are the eIFU files", "eifu_manager"; "eifu mixed case")]
    #[test_case("海關申報", "customs_verifier"; "customs zh")]
    #[test_case("國際註冊", "international_connector"; "international zh")]
    fn test_routes_single_trigger(query: &str, expected: &str) {
        assert_eq!(Router::default().route(query), expected);
    }

    #[test]
    fn test_no_match_returns_default() {
        let router = Router::default();
        assert_eq!(router.route("hello"), DEFAULT_AGENT);
        assert_eq!(router.route(""), DEFAULT_AGENT);
    }

    #[test]
    fn test_declaration_order_wins_over_specificity() {
        let router = Router::default();
        // "verify" (customs) and "international" both match; customs is declared first.
        assert_eq!(router.route("verify international shipment"), "customs_verifier");
        // "text" belongs to the first route, shadowing "recall".
        assert_eq!(router.route("recall notice text"), "nlp_analyzer");
    }

    #[test]
    fn test_custom_router_is_case_insensitive() {
        let router = Router::new([("alpha", ["FOO"]), ("beta", ["bar"])], "beta");
        assert_eq!(router.route("xfoox"), "alpha");
        assert_eq!(router.route("BAR"), "beta");
        assert_eq!(router.route("nothing"), "beta");
        assert_eq!(router.routes().len(), 2);
        assert_eq!(router.default_agent(), "beta");
    }

    fn all_triggers() -> Vec<String> {
        Router::default()
            .routes()
            .iter()
            .flat_map(|r| r.triggers.clone())
            .collect()
    }

    proptest! {
        #[test]
        fn prop_unmatched_queries_route_to_default(query in "[0-9 ,.!?]{0,40}") {
            let router = Router::default();
            prop_assert_eq!(router.route(&query), DEFAULT_AGENT);
        }

        #[test]
        fn prop_single_trigger_routes_to_owner(
            route_idx in 0usize..BUILTIN_ROUTES.len(),
            pad_left in "[0-9 ]{0,8}",
            pad_right in "[0-9 ]{0,8}",
        ) {
            let router = Router::default();
            let route = &router.routes()[route_idx];
            for trigger in &route.triggers {
                let query = format!("{pad_left}{trigger}{pad_right}");
                let owners: Vec<_> = router
                    .routes()
                    .iter()
                    .filter(|r| r.triggers.iter().any(|t| query.contains(t.as_str())))
                    .collect();
                if owners.len() == 1 {
                    prop_assert_eq!(router.route(&query), route.agent.as_str());
                }
            }
        }
    }

    #[test]
    fn test_triggers_are_lowercase() {
        assert!(all_triggers().iter().all(|t| *t == t.to_lowercase()));
    }
}
