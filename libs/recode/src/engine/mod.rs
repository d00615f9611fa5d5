//! The coercion engine.
//!
//! A call resolves both roots to aggregates, then walks the destination
//! depth-first: every visible field is matched by name in the source and
//! either converted by the scalar rules or recursed into (aggregates,
//! sequence elements). The first error aborts the call.

mod composite;
mod matcher;
pub(crate) mod scalar;
pub(crate) mod unwrap;

use composite::Walk;

use crate::config::RecodeConfig;
use crate::error::Result;
use crate::reflect::Reflect;
use crate::value::Value;

/// Recode entry point carrying a [`RecodeConfig`].
///
/// Holds no state between calls; one instance can serve any number of
/// threads.
#[derive(Debug, Clone, Default)]
pub struct Recoder {
    config: RecodeConfig,
}

impl Recoder {
    pub fn new(config: RecodeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RecodeConfig {
        &self.config
    }

    /// Overwrites every visible field of `destination` with the converted
    /// same-named field of `source`.
    ///
    /// Both arguments may sit behind any number of indirections. On error the
    /// destination is left partially written.
    pub fn recode(&self, source: &Value, destination: &mut Value) -> Result<()> {
        let input = unwrap::source_root(source)?;
        let output = unwrap::destination_root(destination)?;
        tracing::debug!(
            source = %input.type_name(),
            destination = %output.type_name(),
            "recode started"
        );

        let mut walk = Walk::new(&self.config);
        match walk.aggregate(input, output) {
            Ok(()) => {
                tracing::debug!("recode finished");
                Ok(())
            }
            Err(e) => {
                tracing::debug!(error = %e, "recode aborted");
                Err(e)
            }
        }
    }

    /// Typed variant of [`recode`](Self::recode).
    ///
    /// `destination` is only written once the whole conversion has succeeded,
    /// so on error it keeps its previous contents.
    pub fn recode_into<S, D>(&self, source: &S, destination: &mut D) -> Result<()>
    where
        S: Reflect,
        D: Reflect,
    {
        let input = source.to_value();
        let mut output = destination.to_value();
        self.recode(&input, &mut output)?;
        destination.assign(&output)
    }
}

/// [`Recoder::recode`] with the default configuration.
pub fn recode(source: &Value, destination: &mut Value) -> Result<()> {
    Recoder::default().recode(source, destination)
}

/// [`Recoder::recode_into`] with the default configuration.
pub fn recode_into<S, D>(source: &S, destination: &mut D) -> Result<()>
where
    S: Reflect,
    D: Reflect,
{
    Recoder::default().recode_into(source, destination)
}

#[cfg(test)]
mod tests;
