//! Scripted transport and ticker used by the unit tests of the core and of the front-ends.

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
};

use async_trait::async_trait;

use crate::{RawResponse, Transport, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

/// Answers requests from per-path queues and records every request it receives.
///
/// A path with an exhausted queue answers with a transport error.
#[derive(Default)]
pub struct FakeTransport {
    responses: RefCell<HashMap<String, VecDeque<Result<RawResponse, TransportError>>>>,
    requests: RefCell<Vec<Recorded>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, path: &str, status: u16, body: serde_json::Value) -> &Self {
        self.push(
            path,
            Ok(RawResponse {
                status,
                body: body.to_string(),
            }),
        )
    }

    pub fn respond_raw(&self, path: &str, status: u16, body: &str) -> &Self {
        self.push(
            path,
            Ok(RawResponse {
                status,
                body: body.to_string(),
            }),
        )
    }

    pub fn fail(&self, path: &str, message: &str) -> &Self {
        self.push(path, Err(TransportError(message.to_string())))
    }

    fn push(&self, path: &str, response: Result<RawResponse, TransportError>) -> &Self {
        self.responses
            .borrow_mut()
            .entry(path.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.borrow().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|r| r.path.clone()).collect()
    }

    fn answer(&self, path: &str) -> Result<RawResponse, TransportError> {
        self.responses
            .borrow_mut()
            .get_mut(path)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(TransportError(format!("no scripted response for {path}"))))
    }
}

#[async_trait(?Send)]
impl Transport for FakeTransport {
    async fn get(&self, path: &str) -> Result<RawResponse, TransportError> {
        self.requests.borrow_mut().push(Recorded {
            method: "GET",
            path: path.to_string(),
            body: None,
        });
        self.answer(path)
    }

    async fn post_json(&self, path: &str, body: String) -> Result<RawResponse, TransportError> {
        self.requests.borrow_mut().push(Recorded {
            method: "POST",
            path: path.to_string(),
            body: serde_json::from_str(&body).ok(),
        });
        self.answer(path)
    }
}

/// Ticker that never waits
#[derive(Default)]
pub struct InstantTicker {
    pub ticks: usize,
}

#[async_trait(?Send)]
impl crate::Ticker for InstantTicker {
    async fn tick(&mut self) {
        self.ticks += 1;
    }
}
