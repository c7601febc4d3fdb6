use std::rc::Rc;

use yew::prelude::*;

use vhq_client::session::{DownloadAction, DownloadSession, SmartAction, SmartSession};

/// Reducer state of the analyze page
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DownloadState(pub DownloadSession);

impl Reducible for DownloadState {
    type Action = DownloadAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut session = self.0.clone();
        session.apply(action);
        Rc::new(Self(session))
    }
}

/// Reducer state of the smart page
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SmartState(pub SmartSession);

impl Reducible for SmartState {
    type Action = SmartAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut session = self.0.clone();
        session.apply(action);
        Rc::new(Self(session))
    }
}
