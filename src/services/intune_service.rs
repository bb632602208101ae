use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::dto::IntuneDeviceDto;
use crate::error::{AppError, AppResult};
use crate::filter::{create_equality_filter, create_starts_with_filter, is_valid_filter_value};
use crate::graph::DeviceDirectory;
use crate::validation::{
    validate_device_id, validate_search_term, validate_serial_number, DEFAULT_SEARCH_TERM_LENGTH,
};

const SEARCH_RESULT_LIMIT: u32 = 50;

/// Validates lookup input and turns it into Graph queries.
pub struct IntuneService {
    directory: Arc<dyn DeviceDirectory>,
}

impl IntuneService {
    pub fn new(directory: Arc<dyn DeviceDirectory>) -> Self {
        Self { directory }
    }

    pub async fn device_by_id(&self, device_id: &str) -> AppResult<IntuneDeviceDto> {
        validate_device_id(Some(device_id)).map_err(AppError::bad_request)?;
        // Graph only routes the canonical hyphenated form.
        let id = Uuid::parse_str(device_id.trim())
            .map_err(|_| AppError::bad_request("Device ID must be a valid GUID"))?
            .hyphenated()
            .to_string();
        Ok(self.directory.get_device(&id).await?)
    }

    pub async fn device_by_serial(&self, serial: &str) -> AppResult<IntuneDeviceDto> {
        validate_serial_number(Some(serial)).map_err(AppError::bad_request)?;
        let filter = create_equality_filter("serialNumber", serial)?;
        debug!("Intune serial lookup: {}", filter);
        self.directory
            .find_devices(&filter, 1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found(format!("No Intune device with serial number {}", serial.trim())))
    }

    /// Devices whose name starts with `term`.
    pub async fn search(&self, term: Option<&str>) -> AppResult<Vec<IntuneDeviceDto>> {
        validate_search_term(term, DEFAULT_SEARCH_TERM_LENGTH)
            .map_err(|msg| AppError::field("search", msg))?;
        let term = term.unwrap_or_default();
        if !is_valid_filter_value(term) {
            return Err(AppError::field("search", "Search term contains unsupported characters"));
        }
        let filter = create_starts_with_filter("deviceName", term)?;
        debug!("Intune device search: {}", filter);
        Ok(self.directory.find_devices(&filter, SEARCH_RESULT_LIMIT).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DisabledDirectory, GraphError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingDirectory {
        filters: Mutex<Vec<String>>,
        ids: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DeviceDirectory for RecordingDirectory {
        async fn get_device(&self, device_id: &str) -> Result<IntuneDeviceDto, GraphError> {
            self.ids.lock().unwrap().push(device_id.to_string());
            Err(GraphError::NotFound(format!("Intune device {} not found", device_id)))
        }

        async fn find_devices(&self, filter: &str, _top: u32) -> Result<Vec<IntuneDeviceDto>, GraphError> {
            self.filters.lock().unwrap().push(filter.to_string());
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn serial_lookup_escapes_quotes() {
        let directory = Arc::new(RecordingDirectory::default());
        let svc = IntuneService::new(directory.clone());
        let err = svc.device_by_serial("AB-12 34").await.unwrap_err();
        assert_eq!(err.status_code().as_u16(), 404);
        assert_eq!(directory.filters.lock().unwrap()[0], "serialNumber eq 'AB-12 34'");
    }

    #[tokio::test]
    async fn search_builds_startswith_filter() {
        let directory = Arc::new(RecordingDirectory::default());
        let svc = IntuneService::new(directory.clone());
        svc.search(Some("LAP-JAN")).await.unwrap();
        assert_eq!(
            directory.filters.lock().unwrap()[0],
            "startswith(deviceName,'LAP-JAN')"
        );
    }

    #[tokio::test]
    async fn search_rejects_injection_attempts() {
        let svc = IntuneService::new(Arc::new(RecordingDirectory::default()));
        assert!(svc.search(Some("x' or 1 eq 1")).await.is_err());
        assert!(svc.search(Some("abc; drop")).await.is_err());
        assert!(svc.search(None).await.is_err());
    }

    #[tokio::test]
    async fn device_id_must_be_a_guid() {
        let svc = IntuneService::new(Arc::new(RecordingDirectory::default()));
        let err = svc.device_by_id("12345").await.unwrap_err();
        assert_eq!(err.status_code().as_u16(), 400);
    }

    #[tokio::test]
    async fn device_id_is_sent_in_hyphenated_form() {
        let directory = Arc::new(RecordingDirectory::default());
        let svc = IntuneService::new(directory.clone());
        for id in [
            "{6F9619FF-8B86-D011-B42D-00CF4FC964FF}",
            "urn:uuid:6f9619ff-8b86-d011-b42d-00cf4fc964ff",
            "6f9619ff8b86d011b42d00cf4fc964ff",
            " 6F9619FF-8B86-D011-B42D-00CF4FC964FF ",
        ] {
            let err = svc.device_by_id(id).await.unwrap_err();
            assert_eq!(err.status_code().as_u16(), 404);
        }
        let ids = directory.ids.lock().unwrap();
        assert_eq!(ids.len(), 4);
        assert!(ids.iter().all(|id| id == "6f9619ff-8b86-d011-b42d-00cf4fc964ff"));
    }

    #[tokio::test]
    async fn disabled_directory_is_unavailable() {
        let svc = IntuneService::new(Arc::new(DisabledDirectory));
        let err = svc.search(Some("LAP")).await.unwrap_err();
        assert_eq!(err.status_code().as_u16(), 503);
    }
}
