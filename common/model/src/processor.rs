use serde::Serialize;

/// Identifies which kind of event a canonical event holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Processor {
    pub name: String,
    pub event: String,
}

impl Processor {
    fn new(name: &str, event: &str) -> Self {
        Self {
            name: name.to_string(),
            event: event.to_string(),
        }
    }

    pub fn span() -> Self {
        Self::new("transaction", "span")
    }

    pub fn transaction() -> Self {
        Self::new("transaction", "transaction")
    }

    pub fn error() -> Self {
        Self::new("error", "error")
    }

    pub fn log() -> Self {
        Self::new("log", "log")
    }

    pub fn metricset() -> Self {
        Self::new("metric", "metric")
    }

    pub fn is_span(&self) -> bool {
        self.name == "transaction" && self.event == "span"
    }

    pub fn is_transaction(&self) -> bool {
        self.name == "transaction" && self.event == "transaction"
    }

    pub fn is_error(&self) -> bool {
        self.name == "error" && self.event == "error"
    }

    pub fn is_log(&self) -> bool {
        self.name == "log" && self.event == "log"
    }

    pub fn is_metricset(&self) -> bool {
        self.name == "metric" && self.event == "metric"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_match_predicates() {
        assert!(Processor::span().is_span());
        assert!(!Processor::span().is_transaction());
        assert!(Processor::transaction().is_transaction());
        assert!(Processor::error().is_error());
        assert!(Processor::log().is_log());
        assert!(Processor::metricset().is_metricset());
        assert!(!Processor::metricset().is_log());
    }
}
