//! Scoped editing session between a storage adapter and a register bank.

use thiserror::Error;

use crate::bank::RegisterBank;
use crate::selftest::SelfTestFailure;
use crate::storage::{StorageAdapter, StorageError};
use crate::Defect;

/// Failure of a session or of work done inside one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Adapter could not load or store.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Loaded data or an edit was rejected.
    #[error(transparent)]
    Defect(#[from] Defect),
    /// Self-test run failed.
    #[error(transparent)]
    SelfTest(#[from] SelfTestFailure),
}

/// Open session owning the bank loaded from an adapter.
///
/// The bank is handed back to the adapter only by [`Session::close`]; a
/// session dropped without closing discards its edits.
#[derive(Debug)]
pub struct Session<'a, S: StorageAdapter + ?Sized> {
    adapter: &'a mut S,
    bank: RegisterBank,
    closed: bool,
}

impl<'a, S: StorageAdapter + ?Sized> Session<'a, S> {
    /// Loads and validates the adapter's register list.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] when loading fails and
    /// [`SessionError::Defect`] when a record is malformed.
    pub fn open(adapter: &'a mut S) -> Result<Self, SessionError> {
        let records = adapter.load()?;
        let bank = RegisterBank::from_records(&records)?;
        log::info!("session opened with {} registers", bank.len());
        Ok(Self {
            adapter,
            bank,
            closed: false,
        })
    }

    /// The session's bank.
    #[must_use]
    pub const fn bank(&self) -> &RegisterBank {
        &self.bank
    }

    /// The session's bank, for edits.
    pub fn bank_mut(&mut self) -> &mut RegisterBank {
        &mut self.bank
    }

    /// Stores the bank through the adapter and ends the session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] when the adapter rejects the list.
    pub fn close(mut self) -> Result<RegisterBank, SessionError> {
        self.closed = true;
        self.adapter.store(self.bank.registers())?;
        log::info!("session closed, stored {} registers", self.bank.len());
        Ok(std::mem::take(&mut self.bank))
    }

    /// Opens a session, runs `work` on its bank, and closes it whether or not
    /// `work` succeeded.
    ///
    /// # Errors
    ///
    /// Returns the error of `work` if it failed, otherwise any open or store
    /// error. A store failure after a failed `work` is logged.
    pub fn run<T>(
        adapter: &'a mut S,
        work: impl FnOnce(&mut RegisterBank) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let mut session = Self::open(adapter)?;
        let outcome = work(session.bank_mut());
        let stored = session.close();
        match (outcome, stored) {
            (Ok(value), Ok(_)) => Ok(value),
            (Ok(_), Err(error)) | (Err(error), Ok(_)) => Err(error),
            (Err(error), Err(store_error)) => {
                log::warn!("store after failed session also failed: {store_error}");
                Err(error)
            }
        }
    }
}

impl<S: StorageAdapter + ?Sized> Drop for Session<'_, S> {
    fn drop(&mut self) {
        if !self.closed {
            log::warn!(
                "session dropped without close; {} registers not stored",
                self.bank.len()
            );
        }
    }
}
