//! Splitting request paths into transformation and media parts.

use mindia_core::{MediaPath, NAMED_TRANSFORMATION_PREFIX};
use mindia_error::MindiaResult;

const OPERATION_PREFIX: &str = "c_";

/// Split a request path such as `/c_scale,w_100/users/a.jpg` into the
/// transformation string and the media path.
///
/// Path elements starting with `c_` or `t_` belong to the transformation,
/// every other element to the media path, each in its original order.
///
/// # Examples
///
/// ```
/// use mindia_transform::split_request_path;
///
/// let (transformations, path) =
///     split_request_path("/c_scale,w_100/users/t_logo/a.jpg").unwrap();
/// assert_eq!(transformations, "c_scale,w_100/t_logo");
/// assert_eq!(path.as_str(), "/users/a.jpg");
/// ```
pub fn split_request_path(request: &str) -> MindiaResult<(String, MediaPath)> {
    let mut transformations = Vec::new();
    let mut media = String::new();

    for part in request.split('/').filter(|part| !part.is_empty()) {
        if part.starts_with(OPERATION_PREFIX) || part.starts_with(NAMED_TRANSFORMATION_PREFIX) {
            transformations.push(part);
        } else {
            media.push('/');
            media.push_str(part);
        }
    }

    if media.is_empty() {
        media.push('/');
    }
    Ok((transformations.join("/"), MediaPath::new(media)?))
}
