use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{HistoryFilter, Reading},
    storage::ReadingRepository,
};

pub const DEFAULT_HISTORY_LIMIT: i64 = 100;

/// Parses a window bound: RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` taken as
/// UTC, or a plain date meaning midnight UTC. Blank means unbounded.
pub fn parse_bound(field: &str, raw: Option<&str>) -> AppResult<Option<DateTime<Utc>>> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Some(ts.and_utc()));
    }
    if let Some(ts) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(Some(ts.and_utc()));
    }

    Err(AppError::validation(format!("Invalid {}", field)))
}

pub struct HistoryService {
    readings: Arc<dyn ReadingRepository>,
    max_limit: i64,
}

impl HistoryService {
    pub fn new(readings: Arc<dyn ReadingRepository>, max_limit: i64) -> Self {
        Self {
            readings,
            max_limit: max_limit.max(1),
        }
    }

    pub fn filter(
        &self,
        device_id: Option<String>,
        start_date: Option<&str>,
        end_date: Option<&str>,
        limit: Option<i64>,
    ) -> AppResult<HistoryFilter> {
        Ok(HistoryFilter {
            device_id,
            start: parse_bound("startDate", start_date)?,
            end: parse_bound("endDate", end_date)?,
            limit: limit
                .unwrap_or(DEFAULT_HISTORY_LIMIT)
                .clamp(1, self.max_limit),
        })
    }

    /// Readings in the window, newest first. An inverted window yields
    /// nothing rather than an error.
    pub async fn history(&self, filter: HistoryFilter) -> AppResult<Vec<Reading>> {
        if filter.is_empty_window() {
            return Ok(Vec::new());
        }
        self.readings.history(filter).await
    }

    pub async fn latest(&self, device_id: &str) -> AppResult<Reading> {
        self.readings
            .latest_reading(device_id)
            .await?
            .ok_or(AppError::ReadingNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MockReadingRepository;
    use chrono::TimeZone;

    fn service(readings: MockReadingRepository) -> HistoryService {
        HistoryService::new(Arc::new(readings), 1000)
    }

    #[test]
    fn parses_supported_bound_formats() {
        let midnight = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        assert_eq!(parse_bound("startDate", Some("2024-03-01")).unwrap(), Some(midnight));
        assert_eq!(
            parse_bound("startDate", Some("2024-03-01T02:00:00+02:00")).unwrap(),
            Some(midnight)
        );
        assert_eq!(
            parse_bound("startDate", Some("2024-03-01T00:00:00")).unwrap(),
            Some(midnight)
        );
        assert_eq!(parse_bound("startDate", Some("  ")).unwrap(), None);
        assert_eq!(parse_bound("startDate", None).unwrap(), None);
    }

    #[test]
    fn rejects_garbage_bounds() {
        let err = parse_bound("endDate", Some("yesterday")).unwrap_err();
        assert!(matches!(err, AppError::Validation(ref msg) if msg == "Invalid endDate"));
    }

    #[test]
    fn limit_defaults_and_clamps() {
        let service = service(MockReadingRepository::new());

        assert_eq!(service.filter(None, None, None, None).unwrap().limit, 100);
        assert_eq!(service.filter(None, None, None, Some(5_000)).unwrap().limit, 1000);
        assert_eq!(service.filter(None, None, None, Some(0)).unwrap().limit, 1);
        assert_eq!(service.filter(None, None, None, Some(-3)).unwrap().limit, 1);
    }

    #[tokio::test]
    async fn inverted_window_is_empty_without_querying() {
        let service = service(MockReadingRepository::new());
        let filter = service
            .filter(Some("X".to_string()), Some("2024-03-02"), Some("2024-03-01"), None)
            .unwrap();

        let readings = service.history(filter).await.unwrap();

        assert!(readings.is_empty());
    }

    #[tokio::test]
    async fn passes_filter_to_repository() {
        let mut readings = MockReadingRepository::new();
        readings
            .expect_history()
            .withf(|filter: &HistoryFilter| {
                filter.device_id.as_deref() == Some("X")
                    && filter.start.is_some()
                    && filter.end.is_none()
            })
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let service = service(readings);
        let filter = service
            .filter(Some("X".to_string()), Some("2024-03-01"), None, Some(10))
            .unwrap();

        tokio_test::assert_ok!(service.history(filter).await);
    }

    #[tokio::test]
    async fn latest_without_readings_is_not_found() {
        let mut readings = MockReadingRepository::new();
        readings.expect_latest_reading().returning(|_| Ok(None));

        let err = service(readings).latest("X").await.unwrap_err();

        assert!(matches!(err, AppError::ReadingNotFound));
    }
}
