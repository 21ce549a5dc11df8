// Fixed upstream contracts. The remote service discriminates on `appid`,
// `systemid` and the method-override header, so each endpoint keeps its
// exact header set here instead of at the call site.

use reqwest::blocking::RequestBuilder;

/// Path, query and fixed headers of one upstream endpoint.
#[derive(Debug, Clone, Copy)]
pub struct Endpoint {
    /// Path relative to the configured base URL. `{profile_id}` is
    /// substituted where present. Empty for absolute endpoints.
    pub path: &'static str,
    pub query: &'static [(&'static str, &'static str)],
    pub headers: &'static [(&'static str, &'static str)],
}

impl Endpoint {
    pub fn url(&self, base_url: &str) -> String {
        format!("{base_url}{}", self.path)
    }

    pub fn profile_url(&self, base_url: &str, profile_id: &str) -> String {
        self.url(base_url).replace("{profile_id}", profile_id)
    }

    /// Attach this endpoint's query and headers to a request.
    pub fn apply(&self, mut builder: RequestBuilder) -> RequestBuilder {
        if !self.query.is_empty() {
            builder = builder.query(self.query);
        }
        for (name, value) in self.headers {
            builder = builder.header(*name, *value);
        }
        builder
    }
}

const JOBSEEKER_HEADERS: &[(&str, &str)] = &[
    ("appid", "103"),
    ("systemid", "jobseeker"),
    ("Content-Type", "application/json"),
];

pub const LOGIN: Endpoint = Endpoint {
    path: "/central-login-services/v1/login",
    query: &[],
    headers: JOBSEEKER_HEADERS,
};

pub const PROFILE: Endpoint = Endpoint {
    path: "/cloudgateway-mynaukri/resman-aggregator-services/v2/users/self",
    query: &[("expand_level", "4")],
    headers: JOBSEEKER_HEADERS,
};

/// Posted to the configured upload URL as-is.
pub const FILE_UPLOAD: Endpoint = Endpoint {
    path: "",
    query: &[],
    headers: &[("appid", "105"), ("systemid", "fileupload")],
};

pub const RESUME_UPDATE: Endpoint = Endpoint {
    path: "/cloudgateway-mynaukri/resman-aggregator-services/v0/users/self/profiles/{profile_id}/advResume",
    query: &[],
    headers: &[
        ("appid", "135"),
        ("systemid", "135"),
        ("Content-Type", "application/json"),
        ("x-http-method-override", "PUT"),
        ("x-requested-with", "XMLHttpRequest"),
    ],
};

pub const FULL_PROFILE_UPDATE: Endpoint = Endpoint {
    path: "/cloudgateway-mynaukri/resman-aggregator-services/v1/users/self/fullprofiles",
    query: &[],
    headers: &[
        ("appid", "135"),
        ("systemid", "Naukri"),
        ("Content-Type", "application/json"),
        ("x-http-method-override", "PUT"),
        ("x-requested-with", "XMLHttpRequest"),
    ],
};

/// Form metadata sent with every resume upload.
pub mod upload_form {
    pub const FORM_KEY: &str = "F51f8e7e54e205";
    pub const UPLOAD_CALLBACK: &str = "true";
    pub const FILE_FIELD: &str = "file";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resume_update_url_embeds_profile_id() {
        let url = RESUME_UPDATE.profile_url("https://www.naukri.com", "12345");
        assert_eq!(
            url,
            "https://www.naukri.com/cloudgateway-mynaukri/resman-aggregator-services/v0/users/self/profiles/12345/advResume"
        );
    }

    #[test]
    fn update_endpoints_override_to_put() {
        for endpoint in [RESUME_UPDATE, FULL_PROFILE_UPDATE] {
            assert!(endpoint
                .headers
                .contains(&("x-http-method-override", "PUT")));
        }
    }

    #[test]
    fn apply_sets_headers_and_query() {
        let client = reqwest::blocking::Client::new();
        let request = PROFILE
            .apply(client.get(PROFILE.url("http://localhost")))
            .build()
            .unwrap();
        assert_eq!(request.url().query(), Some("expand_level=4"));
        assert_eq!(request.headers()["appid"], "103");
        assert_eq!(request.headers()["systemid"], "jobseeker");
    }
}
