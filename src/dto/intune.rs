use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subset of a Graph `managedDevice` exposed to clients. Field names match
/// Graph's own JSON so the same type decodes Graph responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntuneDeviceDto {
    pub id: String,
    pub device_name: Option<String>,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub operating_system: Option<String>,
    pub os_version: Option<String>,
    pub user_principal_name: Option<String>,
    pub last_sync_date_time: Option<DateTime<Utc>>,
    pub compliance_state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceSearchParams {
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_graph_managed_device() {
        let device: IntuneDeviceDto = serde_json::from_value(serde_json::json!({
            "id": "0f9a6b1e-7f0e-4a43-9d7c-6c7c1b0f2e11",
            "deviceName": "LAP-JANSSENS",
            "serialNumber": "5CG1234XYZ",
            "manufacturer": "HP",
            "model": "EliteBook 840 G8",
            "operatingSystem": "Windows",
            "osVersion": "10.0.22631.3447",
            "userPrincipalName": "jan.janssens@example.com",
            "lastSyncDateTime": "2024-05-02T08:15:00Z",
            "complianceState": "compliant",
            "azureADDeviceId": "ignored"
        }))
        .unwrap();
        assert_eq!(device.device_name.as_deref(), Some("LAP-JANSSENS"));
        assert!(device.last_sync_date_time.is_some());
    }
}
