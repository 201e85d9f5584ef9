//! Descriptors for REST and DATA resources and the URLs they map to.

const REST_PATH: &str = "REST";
const DATA_PATH: &str = "DATA";
const LAST: &str = "LAST";

/// Identifies a REST resource, optionally a member and a sub-action.
///
/// A numeric `id` takes precedence over `alt_id`; zero and empty values mean
/// "not set".
///
/// # Examples
///
/// ```
/// use mailjet::ResourceRequest;
///
/// let request = ResourceRequest::new("contactslist")
///     .id(1)
///     .action("managemanycontacts")
///     .action_id(5);
///
/// assert_eq!(
///     request.url("https://api.mailjet.com/v3"),
///     "https://api.mailjet.com/v3/REST/contactslist/1/managemanycontacts/5"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceRequest {
    pub resource: String,
    pub id: i64,
    pub alt_id: String,
    pub action: String,
    pub action_id: i64,
}

impl ResourceRequest {
    /// Targets the collection of `resource`.
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            ..Default::default()
        }
    }

    /// Targets the member with this numeric ID.
    pub fn id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Targets the member with this alternate ID (an email address, a list address, ...).
    pub fn alt_id(mut self, alt_id: impl Into<String>) -> Self {
        self.alt_id = alt_id.into();
        self
    }

    /// Appends a sub-action segment.
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    /// Appends the numeric ID of the sub-action (a job ID, for instance).
    pub fn action_id(mut self, action_id: i64) -> Self {
        self.action_id = action_id;
        self
    }

    /// Builds `{base}/REST/{resource}[/{id}|/{alt_id}][/{action}][/{action_id}]`.
    pub fn url(&self, base_url: &str) -> String {
        let mut tokens = vec![base_url.to_string(), REST_PATH.to_string(), self.resource.clone()];
        if self.id != 0 {
            tokens.push(self.id.to_string());
        } else if !self.alt_id.is_empty() {
            tokens.push(self.alt_id.clone());
        }
        if !self.action.is_empty() {
            tokens.push(self.action.clone());
        }
        if self.action_id != 0 {
            tokens.push(self.action_id.to_string());
        }
        tokens.join("/")
    }
}

/// Identifies a resource on the bulk-data surface.
///
/// # Examples
///
/// ```
/// use mailjet::DataRequest;
///
/// let request = DataRequest::new("contactslist")
///     .source_type_id(12)
///     .data_type("CSVData")
///     .mime_type("text:plain");
///
/// assert_eq!(
///     request.url("https://api.mailjet.com/v3"),
///     "https://api.mailjet.com/v3/DATA/contactslist/12/CSVData/text:plain"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataRequest {
    pub source_type: String,
    pub source_type_id: i64,
    pub data_type: String,
    /// MIME type written with `:` instead of `/`, e.g. `text:csv`.
    pub mime_type: String,
    pub data_type_id: i64,
    /// Targets the most recent upload when no `data_type_id` is given.
    pub last: bool,
}

impl DataRequest {
    pub fn new(source_type: impl Into<String>) -> Self {
        Self {
            source_type: source_type.into(),
            ..Default::default()
        }
    }

    pub fn source_type_id(mut self, id: i64) -> Self {
        self.source_type_id = id;
        self
    }

    pub fn data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = data_type.into();
        self
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn data_type_id(mut self, id: i64) -> Self {
        self.data_type_id = id;
        self
    }

    pub fn last(mut self) -> Self {
        self.last = true;
        self
    }

    /// The `Content-Type` used when uploading to this resource.
    ///
    /// Only the first `:` of the MIME type is turned into a `/`.
    pub fn content_type(&self) -> String {
        if self.mime_type.is_empty() {
            "application/json".to_string()
        } else {
            self.mime_type.replacen(':', "/", 1)
        }
    }

    /// Builds `{base}/DATA/{source}[/{source_id}][/{data_type}[/{mime}]][/{data_id}|/LAST]`.
    pub fn url(&self, base_url: &str) -> String {
        let mut tokens = vec![base_url.to_string(), DATA_PATH.to_string(), self.source_type.clone()];
        if self.source_type_id != 0 {
            tokens.push(self.source_type_id.to_string());
        }
        if !self.data_type.is_empty() {
            tokens.push(self.data_type.clone());
            if !self.mime_type.is_empty() {
                tokens.push(self.mime_type.clone());
            }
        }
        if self.data_type_id != 0 {
            tokens.push(self.data_type_id.to_string());
        } else if self.last {
            tokens.push(LAST.to_string());
        }
        tokens.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://api.mailjet.com/v3";

    #[test]
    fn test_collection_url() {
        assert_eq!(
            ResourceRequest::new("sender").url(BASE),
            "https://api.mailjet.com/v3/REST/sender"
        );
    }

    #[test]
    fn test_full_url() {
        let request = ResourceRequest::new("contactslist")
            .id(1)
            .action("managemanycontacts")
            .action_id(5);
        assert_eq!(
            request.url(BASE),
            "https://api.mailjet.com/v3/REST/contactslist/1/managemanycontacts/5"
        );
    }

    #[test]
    fn test_numeric_id_wins_over_alt_id() {
        let request = ResourceRequest::new("contact").id(3).alt_id("a@b.c");
        assert_eq!(request.url(BASE), "https://api.mailjet.com/v3/REST/contact/3");
    }

    #[test]
    fn test_alt_id_and_action_without_id() {
        let request = ResourceRequest::new("contact")
            .alt_id("a@b.c")
            .action("getcontactslists");
        assert_eq!(
            request.url(BASE),
            "https://api.mailjet.com/v3/REST/contact/a@b.c/getcontactslists"
        );
    }

    #[test]
    fn test_action_id_without_action() {
        let request = ResourceRequest::new("contact").action_id(9);
        assert_eq!(request.url(BASE), "https://api.mailjet.com/v3/REST/contact/9");
    }

    #[test]
    fn test_data_url_last() {
        let request = DataRequest::new("contactslist")
            .source_type_id(4)
            .data_type("CSVData")
            .mime_type("text:plain")
            .last();
        assert_eq!(
            request.url(BASE),
            "https://api.mailjet.com/v3/DATA/contactslist/4/CSVData/text:plain/LAST"
        );
    }

    #[test]
    fn test_data_url_id_wins_over_last() {
        let request = DataRequest::new("batchjob")
            .data_type("JSONError")
            .data_type_id(77)
            .last();
        assert_eq!(
            request.url(BASE),
            "https://api.mailjet.com/v3/DATA/batchjob/JSONError/77"
        );
    }

    #[test]
    fn test_mime_type_needs_data_type() {
        let request = DataRequest::new("contactslist").mime_type("text:plain");
        assert_eq!(request.url(BASE), "https://api.mailjet.com/v3/DATA/contactslist");
    }

    #[test]
    fn test_content_type() {
        assert_eq!(DataRequest::new("x").content_type(), "application/json");
        assert_eq!(
            DataRequest::new("x").mime_type("text:csv:extra").content_type(),
            "text/csv:extra"
        );
    }
}
