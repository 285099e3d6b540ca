//! Plugin manifest served at `/.well-known/ai-plugin.json`

use crate::host::HostContext;
use crate::metadata::ApiMetadata;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestAuth {
    #[serde(rename = "type")]
    pub auth_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestApi {
    #[serde(rename = "type")]
    pub api_type: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    pub schema_version: String,
    pub name_for_human: String,
    pub name_for_model: String,
    pub description_for_human: String,
    pub description_for_model: String,
    pub auth: ManifestAuth,
    pub api: ManifestApi,
    pub logo_url: String,
    pub contact_email: String,
    pub legal_info_url: String,
}

/// Manifest pointing at the YAML document on the same host
pub fn plugin_manifest(host: &HostContext, meta: &ApiMetadata) -> PluginManifest {
    PluginManifest {
        schema_version: "v1".to_string(),
        name_for_human: meta.name_for_human.clone(),
        name_for_model: meta.name_for_model.clone(),
        description_for_human: meta.description_for_human.clone(),
        description_for_model: meta.description_for_model.clone(),
        auth: ManifestAuth { auth_type: "bearer".to_string() },
        api: ManifestApi { api_type: "openapi".to_string(), url: format!("{}/openapi.yaml", host.base_url()) },
        logo_url: meta.logo_url.clone(),
        contact_email: meta.contact_email.clone(),
        legal_info_url: meta.legal_info_url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_follows_host() {
        let manifest = plugin_manifest(&HostContext::new("https", "crm.example.com"), &ApiMetadata::default());
        assert_eq!(manifest.api.url, "https://crm.example.com/openapi.yaml");

        let value = serde_json::to_value(&manifest).unwrap();
        assert_eq!(value["schema_version"], "v1");
        assert_eq!(value["auth"]["type"], "bearer");
        assert_eq!(value["api"]["type"], "openapi");
        assert!(value["name_for_model"].as_str().unwrap().chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }

    #[test]
    fn local_manifest_uses_http() {
        let host = HostContext::detect(Some("localhost:8080"), None, "localhost");
        let manifest = plugin_manifest(&host, &ApiMetadata::default());
        assert_eq!(manifest.api.url, "http://localhost:8080/openapi.yaml");
    }
}
