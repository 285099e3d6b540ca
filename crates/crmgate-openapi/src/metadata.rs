/// Branding and contact details shared by the document and the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiMetadata {
    pub title: String,
    pub description: String,
    pub version: String,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_url: String,
    pub name_for_human: String,
    pub name_for_model: String,
    pub description_for_human: String,
    pub description_for_model: String,
    pub logo_url: String,
    pub legal_info_url: String,
}

impl Default for ApiMetadata {
    fn default() -> Self {
        Self {
            title: "CRMGate CRM API".to_string(),
            description: "API for accessing and querying CRM data using natural language and direct tool calls"
                .to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            contact_name: "CRMGate Team".to_string(),
            contact_email: "dev@crmgate.dev".to_string(),
            contact_url: "https://github.com/crmgate/crmgate".to_string(),
            name_for_human: "CRMGate CRM".to_string(),
            name_for_model: "crmgate_crm".to_string(),
            description_for_human: "Access and query CRM data using natural language".to_string(),
            description_for_model: "Plugin for querying CRM data including leads, contacts, deals, and other \
                entities using natural language queries or direct tool calls."
                .to_string(),
            logo_url: "https://raw.githubusercontent.com/crmgate/crmgate/main/docs/logo.png".to_string(),
            legal_info_url: "https://github.com/crmgate/crmgate/blob/main/LICENSE".to_string(),
        }
    }
}
