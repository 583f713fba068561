//! Turns descriptors into `http::Request`s that any client can send.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::Request;
use http_body_util::Full;
use url::Url;

use crate::descriptor::RequestDescriptor;
use crate::error::BuildError;

const ASTERISK: &str = "*";

impl RequestDescriptor {
    /// Resolves the target to an absolute URL.
    ///
    /// Absolute targets are used as written; anything else is joined onto
    /// `base`.
    pub fn url(&self, base: Option<&Url>) -> Result<Url, BuildError> {
        match Url::parse(&self.target) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = base.ok_or_else(|| BuildError::RelativeTarget(self.target.clone()))?;
                base.join(&self.target).map_err(|source| BuildError::Url {
                    target: self.target.clone(),
                    source,
                })
            }
            Err(source) => Err(BuildError::Url {
                target: self.target.clone(),
                source,
            }),
        }
    }

    /// Builds a transport-level request carrying the method, resolved URL,
    /// every header line and the body.
    ///
    /// The asterisk target (`OPTIONS *`) is passed through as is.
    pub fn to_request(&self, base: Option<&Url>) -> Result<Request<Full<Bytes>>, BuildError> {
        let uri = if self.target == ASTERISK {
            ASTERISK.to_string()
        } else {
            self.url(base)?.into()
        };

        let mut request = Request::builder()
            .method(http::Method::from(self.method))
            .uri(uri)
            .body(Full::new(self.body.clone()))?;
        if let Some(version) = self.version {
            *request.version_mut() = version;
        }

        for (name, value) in self.headers.iter() {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|err| BuildError::Header {
                    name: name.to_string(),
                    reason: err.to_string(),
                })?;
            let header_value = HeaderValue::from_str(value).map_err(|err| BuildError::Header {
                name: name.to_string(),
                reason: err.to_string(),
            })?;
            request.headers_mut().append(header_name, header_value);
        }

        Ok(request)
    }
}
