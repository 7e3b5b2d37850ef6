// SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

pub mod expect;

#[doc(inline)]
pub use expect::Expect;
pub use expect::ExpectedRequest;

use odata_proxy_core::HttpRequest;
use odata_proxy_core::RequestContext;
use odata_proxy_core::ResponseRecord;
use odata_proxy_core::Transport as ProxyTransport;
use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::sync::Mutex;
use std::sync::PoisonError;

#[derive(Debug)]
pub enum Error {
    ErrorResponse(Box<dyn StdError + Send + Sync>),
    MutexLock(String),
    NothingIsExpected,
    UnexpectedRequest(ExpectedRequest, ExpectedRequest),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::ErrorResponse(err) => write!(f, "response: {err}"),
            Self::MutexLock(err) => write!(f, "lock error: {err}"),
            Self::NothingIsExpected => {
                write!(f, "nothing is expected to happen but something happened")
            }
            Self::UnexpectedRequest(actual, expected) => {
                let body = actual
                    .body
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                write!(
                    f,
                    "unexpected request: {} {}; json: {body} expected: {expected:?}",
                    actual.method, actual.uri
                )
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::ErrorResponse(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl Error {
    pub fn mutex_lock<T>(err: PoisonError<T>) -> Self {
        Self::MutexLock(err.to_string())
    }
}

/// Transport that answers requests from a queue of expectations.
pub struct Transport<E> {
    expect: Mutex<VecDeque<Expect<E>>>,
    contexts: Mutex<Vec<RequestContext>>,
}

impl<E> Default for Transport<E> {
    fn default() -> Self {
        Self {
            expect: Mutex::new(VecDeque::new()),
            contexts: Mutex::new(Vec::new()),
        }
    }
}

impl<E> Transport<E> {
    /// Queue expectation after the ones already queued.
    pub fn expect(&self, exp: Expect<E>) {
        let expect: &mut VecDeque<Expect<E>> = &mut self.expect.lock().expect("not poisoned");
        expect.push_back(exp);
    }

    /// True if every queued expectation was consumed.
    pub fn is_done(&self) -> bool {
        self.expect.lock().expect("not poisoned").is_empty()
    }

    /// Request contexts seen so far.
    pub fn contexts(&self) -> Vec<RequestContext> {
        self.contexts.lock().expect("not poisoned").clone()
    }

    pub fn debug_expect(&self) {
        let expect: &VecDeque<Expect<E>> = &self.expect.lock().expect("not poisoned");
        println!("Expectations (total: {})", expect.len());
        for v in expect {
            println!("{:#?}", v.request);
        }
    }
}

impl<E> ProxyTransport for Transport<E>
where
    E: StdError + Send + Sync + 'static,
{
    type Error = Error;

    async fn send(
        &self,
        request: &HttpRequest,
        context: &RequestContext,
    ) -> Result<Vec<ResponseRecord>, Error> {
        self.contexts
            .lock()
            .map_err(Error::mutex_lock)?
            .push(context.clone());
        let expect = self
            .expect
            .lock()
            .map_err(Error::mutex_lock)?
            .pop_front()
            .ok_or(Error::NothingIsExpected)?;
        let actual = ExpectedRequest {
            method: request.method.clone(),
            uri: request.uri.clone(),
            body: request.body.clone(),
        };
        if actual == expect.request {
            expect
                .response
                .map_err(|err| Error::ErrorResponse(Box::new(err)))
        } else {
            Err(Error::UnexpectedRequest(actual, expect.request))
        }
    }
}
