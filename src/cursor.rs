//! Lazy, single-pass iteration over a query cursor.
//!
//! [`ResultSetIterator`] wraps any [`FallibleIterator`] of raw rows (in
//! practice a [`postgres::RowIter`]) and turns each row into a caller-defined
//! value on demand. Both the row conversion and the failure handling are
//! injected as closures, so one type serves every catalog query.
//!
//! Fetch and conversion failures are handed to the failure handler and
//! returned to the caller at the call that observed them. After a failure,
//! exhaustion or [`ResultSetIterator::close`] the cursor is dropped and the
//! iterator stays finished.

use postgres::fallible_iterator::FallibleIterator;

use crate::error::MetaDataAccessError;

type ConvertRow<'a, R, T, E> = Box<dyn FnMut(&R) -> Result<T, E> + 'a>;
type HandleError<'a, E> = Box<dyn FnMut(E) -> MetaDataAccessError + 'a>;

/// Forward-only iterator that converts cursor rows lazily.
pub struct ResultSetIterator<'a, I, T>
where
    I: FallibleIterator,
{
    rows: Option<I>,
    /// Row fetched by `has_next` but not yet handed out.
    pending: Option<I::Item>,
    convert_row: ConvertRow<'a, I::Item, T, I::Error>,
    handle_error: HandleError<'a, I::Error>,
}

impl<'a, I, T> ResultSetIterator<'a, I, T>
where
    I: FallibleIterator,
{
    pub fn new(
        rows: I,
        convert_row: impl FnMut(&I::Item) -> Result<T, I::Error> + 'a,
        handle_error: impl FnMut(I::Error) -> MetaDataAccessError + 'a,
    ) -> Self {
        Self {
            rows: Some(rows),
            pending: None,
            convert_row: Box::new(convert_row),
            handle_error: Box::new(handle_error),
        }
    }

    /// Whether another value is available.
    ///
    /// Fetches at most one row ahead; repeated calls do not consume rows.
    pub fn has_next(&mut self) -> Result<bool, MetaDataAccessError> {
        if self.pending.is_some() {
            return Ok(true);
        }

        let fetched = match self.rows.as_mut() {
            Some(rows) => rows.next(),
            None => return Ok(false),
        };

        match fetched {
            Ok(Some(row)) => {
                self.pending = Some(row);
                Ok(true)
            }
            Ok(None) => {
                self.close();
                Ok(false)
            }
            Err(e) => {
                self.close();
                Err((self.handle_error)(e))
            }
        }
    }

    /// Fetch and convert the next value, or `Ok(None)` once exhausted.
    pub fn next_value(&mut self) -> Result<Option<T>, MetaDataAccessError> {
        if !self.has_next()? {
            return Ok(None);
        }
        let Some(row) = self.pending.take() else {
            return Ok(None);
        };

        match (self.convert_row)(&row) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                self.close();
                Err((self.handle_error)(e))
            }
        }
    }

    /// Release the cursor. Further calls report exhaustion.
    pub fn close(&mut self) {
        self.rows = None;
        self.pending = None;
    }

    pub fn is_closed(&self) -> bool {
        self.rows.is_none() && self.pending.is_none()
    }
}

impl<I, T> Iterator for ResultSetIterator<'_, I, T>
where
    I: FallibleIterator,
{
    type Item = Result<T, MetaDataAccessError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_value().transpose()
    }
}

impl<I, T> std::iter::FusedIterator for ResultSetIterator<'_, I, T> where I: FallibleIterator {}
