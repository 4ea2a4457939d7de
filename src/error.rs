use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrollViewError {
    /// The container id/selector did not resolve to any element.
    #[error("missing container: {0}")]
    MissingContainer(String),

    /// The resolved container is not an HTML element.
    #[error("container is not an HTML element")]
    NotAnElement,

    /// No global `window` object (not running in a browser context).
    #[error("no window object available")]
    NoWindow,
}
