//! Call and click markers
//!
//! Both carry a statement list such as `save({{form}}); notify('saved')`.
//! Every statement names a registered delegate; nothing else can run. The
//! call marker runs its list once, last in a bind pass. The click marker
//! runs its list on every click.

use crate::{BindError, Runtime};
use brisk_config::{Statement, Value};
use brisk_dom::{EventType, NodeId};
use std::rc::Rc;

/// Run the call marker on `element` once
pub(crate) fn call(rt: &mut Runtime, element: NodeId, marker: &str) -> Result<(), BindError> {
    if !rt.first_time(element, marker) {
        return Ok(());
    }
    let statements = take_statements(rt, element, marker)?;
    run(rt, &statements)?;
    Ok(())
}

pub(crate) fn bind_click(rt: &mut Runtime, element: NodeId) -> Result<(), BindError> {
    let marker = rt.markers().click.clone();
    if !rt.first_time(element, &marker) {
        return Ok(());
    }
    let statements: Rc<[Statement]> = take_statements(rt, element, &marker)?.into();
    rt.listen(element, EventType::Click, move |rt, _event| run(rt, &statements).map(drop));
    Ok(())
}

/// Parse the statement list in the attribute, then clear it
fn take_statements(rt: &mut Runtime, element: NodeId, marker: &str) -> Result<Vec<Statement>, BindError> {
    let text = rt
        .document()
        .get_attribute(element, marker)
        .unwrap_or_default()
        .to_string();
    let statements = brisk_config::parse_statements(&text, &mut rt.scope(element, marker))?;
    rt.document_mut().set_attribute(element, marker, "")?;
    Ok(statements)
}

fn run(rt: &mut Runtime, statements: &[Statement]) -> Result<Vec<Value>, BindError> {
    statements
        .iter()
        .map(|statement| rt.call_func(&statement.func, &statement.args))
        .collect()
}

impl Runtime {
    /// Evaluate a statement list in the context of `element`; returns each
    /// statement's result
    pub fn run_script(&mut self, element: NodeId, text: &str) -> Result<Vec<Value>, BindError> {
        let marker = self.markers().call.clone();
        let statements = brisk_config::parse_statements(text, &mut self.scope(element, &marker))?;
        run(self, &statements)
    }
}
