//! Shared helpers for runtime integration tests

#![allow(dead_code)]

use brisk_runtime::dom::NodeId;
use brisk_runtime::net::MockTransport;
use brisk_runtime::{BindError, Handler, Runtime};
use std::cell::RefCell;
use std::rc::Rc;

/// Route `RUST_LOG` output through the test harness
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Runtime over `html` talking to `mock`, not yet started
pub fn runtime(html: &str, mock: &MockTransport) -> Runtime {
    init_logging();
    Runtime::builder()
        .with_transport(mock.clone())
        .build(brisk_runtime::html::parse(html))
        .expect("runtime")
}

/// Started runtime with every request settled
pub fn started(html: &str, mock: &MockTransport) -> Runtime {
    let mut rt = runtime(html, mock);
    rt.start();
    smol::block_on(rt.settle());
    rt
}

pub fn first(rt: &Runtime, tag: &str) -> NodeId {
    rt.document().elements_by_tag(NodeId::ROOT, &[tag])[0]
}

/// Marker handler that logs every element it is asked to bind
#[derive(Clone, Default)]
pub struct Spy {
    pub log: Rc<RefCell<Vec<String>>>,
}

impl Spy {
    pub fn entries(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

impl Handler for Spy {
    fn bind(&self, rt: &mut Runtime, element: NodeId, marker: &str) -> Result<(), BindError> {
        if rt.first_time(element, marker) {
            self.log.borrow_mut().push(format!("{marker}@{element}"));
        }
        Ok(())
    }
}
