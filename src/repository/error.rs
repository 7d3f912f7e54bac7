//! Error handling for the `repository` module.
//!
//! Problems with the objects themselves are never errors in the Rust sense.
//! They are recorded in a [`ValidationResult`][crate::validation::
//! ValidationResult] instead. What is left are the errors of building new
//! objects.

use std::{error, fmt};
use crate::crypto::signer::{KeyError, SigningError};


//------------ BuildError ----------------------------------------------------

/// An error happened while building a signed object.
#[derive(Clone, Debug)]
pub enum BuildError<S> {
    /// A required field was not provided.
    MissingField(&'static str),

    /// A field has a value that cannot be encoded.
    InvalidField(&'static str),

    /// Signing failed.
    Signing(SigningError<S>),
}

impl<S> From<SigningError<S>> for BuildError<S> {
    fn from(err: SigningError<S>) -> Self {
        BuildError::Signing(err)
    }
}

impl<S> From<KeyError<S>> for BuildError<S> {
    fn from(err: KeyError<S>) -> Self {
        BuildError::Signing(err.into())
    }
}

impl<S: fmt::Display> fmt::Display for BuildError<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            BuildError::MissingField(field) => {
                write!(f, "missing required field '{}'", field)
            }
            BuildError::InvalidField(field) => {
                write!(f, "invalid value for field '{}'", field)
            }
            BuildError::Signing(ref err) => write!(f, "{}", err),
        }
    }
}

impl<S: fmt::Debug + fmt::Display> error::Error for BuildError<S> { }
