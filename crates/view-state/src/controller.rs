use std::sync::Arc;

use crate::address::QueriedAddress;
use crate::error::ViewError;
use crate::record::IpRecord;

/// Which record the dashboard is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// The viewer's own address, as handed over at load.
    #[default]
    SelfIp,
    /// The result of an explicit search.
    Search,
}

impl ViewMode {
    pub const fn badge(self) -> &'static str {
        match self {
            Self::SelfIp => "Viewing Your IP",
            Self::Search => "Viewing Search Results",
        }
    }
}

/// Owns the displayed record, the view mode and the refresh guard.
///
/// `original` is captured at load and never replaced. In [`ViewMode::SelfIp`]
/// `current` is the very same allocation as `original`.
#[derive(Debug, Clone)]
pub struct ViewController {
    original: Arc<IpRecord>,
    current: Arc<IpRecord>,
    mode: ViewMode,
    searched: Option<QueriedAddress>,
    refreshing: bool,
}

impl ViewController {
    pub fn load(original: IpRecord) -> Self {
        let original = Arc::new(original);
        Self {
            current: Arc::clone(&original),
            original,
            mode: ViewMode::SelfIp,
            searched: None,
            refreshing: false,
        }
    }

    pub fn current(&self) -> &IpRecord {
        &self.current
    }

    pub fn original(&self) -> &IpRecord {
        &self.original
    }

    pub const fn mode(&self) -> ViewMode {
        self.mode
    }

    /// The address shown in the search header; `None` outside search mode.
    pub const fn searched_address(&self) -> Option<&QueriedAddress> {
        self.searched.as_ref()
    }

    /// Whether `current` is the load-time record itself.
    pub fn shows_original(&self) -> bool {
        Arc::ptr_eq(&self.current, &self.original)
    }

    pub const fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    /// Checks a search query before any lookup is issued.
    pub fn validate_query(&self, input: &str) -> Result<QueriedAddress, ViewError> {
        let address = QueriedAddress::parse(input)?;
        if self.refreshing {
            return Err(ViewError::RefreshPending);
        }
        Ok(address)
    }

    /// Shows a lookup result for `queried_address`.
    ///
    /// Fails without touching state when the address is malformed, when a
    /// refresh is pending, or when the record carries an error.
    pub fn apply_search_result(
        &mut self,
        record: IpRecord,
        queried_address: &str,
    ) -> Result<(), ViewError> {
        let address = self.validate_query(queried_address)?;

        if let Some(message) = record.error_message() {
            return Err(ViewError::LookupFailed(message.to_string()));
        }

        self.current = Arc::new(record);
        self.mode = ViewMode::Search;
        self.searched = Some(address);
        Ok(())
    }

    pub fn return_to_self(&mut self) {
        self.current = Arc::clone(&self.original);
        self.mode = ViewMode::SelfIp;
        self.searched = None;
    }

    pub fn begin_refresh(&mut self) -> Result<(), ViewError> {
        if self.refreshing {
            return Err(ViewError::AlreadyRefreshing);
        }
        self.refreshing = true;
        Ok(())
    }

    pub fn end_refresh(&mut self) {
        self.refreshing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::{ViewController, ViewMode};
    use crate::{IpRecord, ViewError};

    fn record(ipv4: &str, latitude: f64, longitude: f64) -> IpRecord {
        IpRecord {
            ipv4: Some(ipv4.to_string()),
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..IpRecord::default()
        }
    }

    #[test]
    fn load_starts_in_self_mode() {
        let controller = ViewController::load(record("1.2.3.4", 10.0, 20.0));

        assert_eq!(controller.mode(), ViewMode::SelfIp);
        assert!(controller.shows_original());
        assert_eq!(controller.current().ipv4.as_deref(), Some("1.2.3.4"));
        assert!(controller.searched_address().is_none());
        assert!(!controller.is_refreshing());
    }

    #[test]
    fn search_then_return_restores_original() {
        let original = record("1.2.3.4", 10.0, 20.0);
        let mut controller = ViewController::load(original.clone());

        controller
            .apply_search_result(record("5.6.7.8", 0.0, 0.0), "5.6.7.8")
            .unwrap();
        assert_eq!(controller.mode(), ViewMode::Search);
        assert_eq!(controller.current().ipv4.as_deref(), Some("5.6.7.8"));
        assert_eq!(
            controller.searched_address().map(|address| address.as_str()),
            Some("5.6.7.8")
        );
        assert!(!controller.shows_original());

        controller.return_to_self();
        assert_eq!(controller.mode(), ViewMode::SelfIp);
        assert_eq!(controller.current(), &original);
        assert!(controller.shows_original());
        assert!(controller.searched_address().is_none());
    }

    #[test]
    fn return_to_self_after_many_searches() {
        let original = record("1.2.3.4", 10.0, 20.0);
        let mut controller = ViewController::load(original.clone());

        for octet in 1..=5 {
            let address = format!("9.9.9.{octet}");
            controller
                .apply_search_result(record(&address, 1.0, 1.0), &address)
                .unwrap();
        }
        controller.return_to_self();
        controller.return_to_self();

        assert_eq!(controller.current(), &original);
        assert_eq!(controller.original(), &original);
        assert_eq!(controller.mode(), ViewMode::SelfIp);
    }

    #[test]
    fn invalid_address_leaves_state_unchanged() {
        let original = record("1.2.3.4", 10.0, 20.0);
        let mut controller = ViewController::load(original.clone());

        let result = controller.apply_search_result(record("9.9.9.9", 1.0, 1.0), "999.1.1.1");

        assert_eq!(
            result,
            Err(ViewError::InvalidAddress("999.1.1.1".to_string()))
        );
        assert_eq!(controller.current(), &original);
        assert_eq!(controller.mode(), ViewMode::SelfIp);

        let again = controller.apply_search_result(record("9.9.9.9", 1.0, 1.0), "999.1.1.1");
        assert_eq!(again, result);
        assert!(controller.shows_original());
    }

    #[test]
    fn error_record_is_rejected_without_state_change() {
        let mut controller = ViewController::load(record("1.2.3.4", 10.0, 20.0));
        controller
            .apply_search_result(record("5.6.7.8", 0.0, 0.0), "5.6.7.8")
            .unwrap();

        let result =
            controller.apply_search_result(IpRecord::from_error("Reserved IP address"), "10.0.0.1");

        assert_eq!(
            result,
            Err(ViewError::LookupFailed("Reserved IP address".to_string()))
        );
        assert_eq!(controller.mode(), ViewMode::Search);
        assert_eq!(controller.current().ipv4.as_deref(), Some("5.6.7.8"));
    }

    #[test]
    fn refresh_guard_rejects_reentry() {
        let mut controller = ViewController::load(IpRecord::default());

        assert_eq!(controller.begin_refresh(), Ok(()));
        assert_eq!(controller.begin_refresh(), Err(ViewError::AlreadyRefreshing));

        controller.end_refresh();
        assert_eq!(controller.begin_refresh(), Ok(()));
    }

    #[test]
    fn end_refresh_is_unconditional() {
        let mut controller = ViewController::load(IpRecord::default());
        controller.end_refresh();
        assert!(!controller.is_refreshing());
    }

    #[test]
    fn searches_wait_for_pending_refresh() {
        let mut controller = ViewController::load(record("1.2.3.4", 10.0, 20.0));
        controller.begin_refresh().unwrap();

        assert_eq!(
            controller.validate_query("8.8.8.8"),
            Err(ViewError::RefreshPending)
        );
        assert_eq!(
            controller.apply_search_result(record("8.8.8.8", 1.0, 1.0), "8.8.8.8"),
            Err(ViewError::RefreshPending)
        );
        assert!(controller.shows_original());
    }

    #[test]
    fn badges_follow_mode() {
        assert_eq!(ViewMode::SelfIp.badge(), "Viewing Your IP");
        assert_eq!(ViewMode::Search.badge(), "Viewing Search Results");
    }
}
