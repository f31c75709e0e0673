//! # Form Automation
//!
//! Drives a desktop database application that hosts data-entry forms: open a
//! database, open a form, fill its fields in order and press its run button.
//!
//! The application itself sits behind [`FormApplication`]; backends are platform
//! specific and report failures as [`anyhow::Error`]. [`FormSession`] guarantees
//! the database is closed and the application quit however the session ends.
use crate::error::WorkbookError;
use log::{debug, error, warn};
use std::path::Path;
use thiserror::Error;

/// A failed automation step. The source is the backend's own error.
#[derive(Error, Debug)]
pub enum AutomationError {
    #[error("Open database '{path}' failed: {source:#}")]
    OpenDatabase {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Open form '{form}' failed: {source:#}")]
    OpenForm {
        form: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Fill form '{form}' failed: {source:#}")]
    FillForm {
        form: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Run form '{form}' failed: {source:#}")]
    RunForm {
        form: String,
        #[source]
        source: anyhow::Error,
    },
}

/// A desktop application that can open a database and drive its forms.
pub trait FormApplication {
    fn open_database(&mut self, path: &Path) -> anyhow::Result<()>;

    fn open_form(&mut self, form: &str) -> anyhow::Result<()>;

    /// Fills the form's fields with `fields`, in the form's field order.
    fn fill_form(&mut self, form: &str, fields: &[&str]) -> anyhow::Result<()>;

    /// Presses the form's run button.
    fn run_form(&mut self, form: &str) -> anyhow::Result<()>;

    fn close_database(&mut self) -> anyhow::Result<()>;

    fn quit(&mut self) -> anyhow::Result<()>;
}

/// An application with a database open.
///
/// Dropping the session closes the database and quits the application. Failures
/// there are logged, never returned, so they cannot hide the error that ended the
/// session. Step failures are logged before the session is released.
pub struct FormSession<'a, A: FormApplication + ?Sized> {
    app: &'a mut A,
}

impl<'a, A: FormApplication + ?Sized> FormSession<'a, A> {
    /// Opens `database` in `app`. On failure the application is released before returning.
    pub fn open(app: &'a mut A, database: &Path) -> Result<Self, AutomationError> {
        debug!("Opening database '{}'", database.display());
        let session = Self { app };
        match session.app.open_database(database) {
            Ok(()) => Ok(session),
            Err(source) => Err(logged(AutomationError::OpenDatabase {
                path: database.display().to_string(),
                source,
            })),
        }
    }

    pub fn open_form(&mut self, form: &str) -> Result<(), AutomationError> {
        debug!("Opening form '{}'", form);
        self.app.open_form(form).map_err(|source| {
            logged(AutomationError::OpenForm {
                form: form.to_owned(),
                source,
            })
        })
    }

    pub fn fill_form(&mut self, form: &str, fields: &[&str]) -> Result<(), AutomationError> {
        debug!("Filling form '{}' with {} field(s)", form, fields.len());
        self.app.fill_form(form, fields).map_err(|source| {
            logged(AutomationError::FillForm {
                form: form.to_owned(),
                source,
            })
        })
    }

    pub fn run_form(&mut self, form: &str) -> Result<(), AutomationError> {
        debug!("Running form '{}'", form);
        self.app.run_form(form).map_err(|source| {
            logged(AutomationError::RunForm {
                form: form.to_owned(),
                source,
            })
        })
    }
}

impl<A: FormApplication + ?Sized> Drop for FormSession<'_, A> {
    fn drop(&mut self) {
        if let Err(error) = self.app.close_database() {
            warn!("Close database failed: {:#}", error);
        }
        if let Err(error) = self.app.quit() {
            warn!("Quit application failed: {:#}", error);
        }
    }
}

fn logged(error: AutomationError) -> AutomationError {
    error!("{}", error);
    error
}

/// Opens `form` in `database`, fills it with `fields` in order and runs it.
///
/// The application is closed and quit whether or not a step fails; the first
/// failing step's error is returned after that.
pub fn form_fill_run<A: FormApplication + ?Sized>(
    app: &mut A,
    database: &Path,
    form: &str,
    fields: &[&str],
) -> Result<(), WorkbookError> {
    let mut session = FormSession::open(app, database)?;
    session.open_form(form)?;
    session.fill_form(form, fields)?;
    session.run_form(form)?;
    Ok(())
}
