//! Request body and query-string helpers

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Body, Request};
use serde::Serialize;
use url::Url;

/// Serialize `value` as the JSON body of `request`, setting the content type.
pub fn attach_json_body<T: Serialize>(
    request: &mut Request,
    value: &T,
) -> serde_json::Result<()> {
    let bytes = serde_json::to_vec(value)?;
    request
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    *request.body_mut() = Some(Body::from(bytes));
    Ok(())
}

/// Append query parameters to a URL.
///
/// Existing parameters are kept and duplicate keys accumulate, giving
/// multi-value query semantics. Array-style parameters must be pre-encoded by
/// the caller as `name[0]`, `name[1]`, and so on.
pub fn append_query<K, V>(url: &mut Url, parameters: impl IntoIterator<Item = (K, V)>)
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs = url.query_pairs_mut();
    for (key, value) in parameters {
        pairs.append_pair(key.as_ref(), value.as_ref());
    }
}

/// Resolve `relative_or_absolute` against `base` and append query parameters.
///
/// Pure function: neither input is modified.
pub fn build_query_url<K, V>(
    base: &Url,
    relative_or_absolute: &str,
    parameters: impl IntoIterator<Item = (K, V)>,
) -> Result<Url, url::ParseError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut url = base.join(relative_or_absolute)?;
    append_query(&mut url, parameters);
    Ok(url)
}
