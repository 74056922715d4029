//! Load marker
//!
//! One-shot fetch of an HTML fragment into the element. The attribute value
//! is the URL.

use crate::{BindError, Runtime};
use brisk_dom::NodeId;
use brisk_net::{Negotiation, Request, ReturnFormat, SendFormat, Ticket};

pub(crate) fn bind(rt: &mut Runtime, element: NodeId) -> Result<(), BindError> {
    let marker = rt.markers().load.clone();
    if !rt.first_time(element, &marker) {
        return Ok(());
    }
    let url = rt
        .document()
        .get_attribute(element, &marker)
        .unwrap_or_default()
        .trim()
        .to_string();
    rt.document_mut().set_attribute(element, &marker, "")?;
    if url.is_empty() {
        return Err(BindError::MissingOption("url"));
    }
    rt.load_file(element, &url);
    Ok(())
}

impl Runtime {
    /// Fetch `url` and render the response as the children of `element`.
    ///
    /// Failures are logged; the element keeps its content.
    pub fn load_file(&mut self, element: NodeId, url: &str) -> Ticket {
        let negotiation = Negotiation {
            send_format: SendFormat::Html,
            return_format: ReturnFormat::Html,
            ..Negotiation::default()
        };
        let request = Request::get(url)
            .with_header("Content-Type", &negotiation.content_type())
            .with_header("Accept", negotiation.return_format.accept());

        let url = url.to_string();
        self.submit(request, move |rt, result| match result {
            Ok(response) => {
                if let Err(err) = brisk_html::set_inner_html(rt.document_mut(), element, &response.text()) {
                    tracing::warn!("cannot render {} into {}: {}", url, element, err);
                }
            }
            Err(err) => tracing::warn!("load of {} into {} failed: {}", url, element, err),
        })
    }
}
