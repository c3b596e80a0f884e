//! Shared fixtures for the integration tests.
//!
//! [`Recorder`] builds a [`MethodTable`] whose methods append every call to a
//! shared log, so tests can assert on what ran and in which order.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use callwire::prelude::*;

pub const SCOREBOARD: &str = "Game.Scoreboard";
pub const HUD: &str = "Game.Hud";

/// One recorded call: `Type.Method` plus the boxed arguments it received.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: String,
    pub args: Vec<Dynamic>,
}

/// A method table that logs every call.
pub struct Recorder {
    pub table: MethodTable,
    log: Arc<Mutex<Vec<Call>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            table: MethodTable::new(),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The standard fixture: a scoreboard and a HUD with a handful of methods.
    pub fn game() -> Self {
        let mut recorder = Self::new();
        recorder.record(set_score());
        recorder.record(show_score());
        recorder.record(set_speed());
        recorder.record(reset());
        recorder
    }

    /// Register `info` with a body that only logs the call.
    pub fn record(&mut self, info: MethodInfo) {
        let log = Arc::clone(&self.log);
        let name = format!("{}.{}", info.owner.short_name(), info.name);
        self.table
            .register(info, move |ctx: &mut CallContext| -> Result<(), NativeError> {
                log.lock().unwrap().push(Call {
                    method: name.clone(),
                    args: ctx.args().to_vec(),
                });
                Ok(())
            })
            .unwrap();
    }

    /// Register `info` with a body that always fails.
    pub fn refuse(&mut self, info: MethodInfo) {
        self.table
            .register(info, |_: &mut CallContext| -> Result<(), NativeError> {
                Err(NativeError::other("refused"))
            })
            .unwrap();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    /// Just the `Type.Method` names, in call order.
    pub fn names(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.method).collect()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }

    pub fn runtime(&self) -> InvokeContext<'_> {
        InvokeContext::runtime(&self.table)
    }

    pub fn editor(&self) -> InvokeContext<'_> {
        InvokeContext::editor(&self.table)
    }
}

pub fn scoreboard() -> ObjectRef {
    ObjectRef::new(ObjectId(10), SCOREBOARD)
}

pub fn hud() -> ObjectRef {
    ObjectRef::new(ObjectId(20), HUD)
}

/// `void SetScore(int score)`
pub fn set_score() -> MethodInfo {
    MethodInfo::new(TypeInfo::object(SCOREBOARD), "SetScore").param("score", i32::type_info())
}

/// `void ShowScore(int score, bool best)`
pub fn show_score() -> MethodInfo {
    MethodInfo::new(TypeInfo::object(HUD), "ShowScore")
        .param("score", i32::type_info())
        .param("best", bool::type_info())
}

/// `void set_Speed(float value)`
pub fn set_speed() -> MethodInfo {
    MethodInfo::new(TypeInfo::object(HUD), "set_Speed").param("value", f32::type_info())
}

/// `void Reset()`
pub fn reset() -> MethodInfo {
    MethodInfo::new(TypeInfo::object(SCOREBOARD), "Reset")
}
