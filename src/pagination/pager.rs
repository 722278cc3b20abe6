//! The generic pager
//!
//! A [`Pager`] binds a fetch callable, the parameters that produced the
//! current page, and a [`Cursor`] strategy. The first page is fetched
//! eagerly at construction; afterwards the pager only refetches when asked
//! to advance, and it never refetches once a page comes back empty.

use super::cursor::Cursor;
use crate::error::Result;
use futures::future::BoxFuture;
use futures::stream::{self, Stream};
use std::collections::{HashMap, VecDeque};
use std::ops::Index;

/// Query parameters for a single page fetch
pub type Params = HashMap<String, String>;

/// A callable that fetches one page of entities for the given parameters.
///
/// Must return an empty page, never an error, when the server indicates
/// there is no more data.
pub type FetchFn<'a, T> = Box<dyn Fn(Params) -> BoxFuture<'a, Result<Vec<T>>> + Send + Sync + 'a>;

/// Pages through a list resource one fetch at a time
pub struct Pager<'a, T> {
    fetch: FetchFn<'a, T>,
    cursor: Box<dyn Cursor<T> + 'a>,
    params: Params,
    items: Vec<T>,
}

impl<'a, T> Pager<'a, T> {
    /// Create a pager and eagerly fetch the first page.
    ///
    /// `params` must already have absent values dropped; whatever is in the
    /// map is sent on the wire.
    pub async fn open(
        fetch: FetchFn<'a, T>,
        cursor: Box<dyn Cursor<T> + 'a>,
        params: Params,
    ) -> Result<Pager<'a, T>> {
        let items = (fetch)(params.clone()).await?;
        Ok(Self {
            fetch,
            cursor,
            params,
            items,
        })
    }

    /// The current page of items
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of items in the current page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the current page is empty (the resource is exhausted)
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The i-th item of the current page, if in range
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Iterate over the current page's items
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// The parameters that produced the current page
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Fetch the next page, replacing the current one.
    ///
    /// When the current page is already empty this is a no-op without a
    /// network call: refetching with unchanged parameters would return the
    /// same empty result.
    pub async fn advance(&mut self) -> Result<&[T]> {
        self.step().await?;
        Ok(&self.items)
    }

    /// Advance to the next page and hand back the one it replaced
    async fn step(&mut self) -> Result<Vec<T>> {
        if self.items.is_empty() {
            return Ok(Vec::new());
        }
        self.cursor.advance(&mut self.params, &self.items);
        let next = (self.fetch)(self.params.clone()).await?;
        Ok(std::mem::replace(&mut self.items, next))
    }

    /// Drain every page and collect all items.
    ///
    /// Terminates exactly when a fetched page is empty; the server
    /// contract is "empty page means no more data".
    pub async fn all(mut self) -> Result<Vec<T>> {
        let mut collected = Vec::new();
        while !self.items.is_empty() {
            let page = self.step().await?;
            collected.extend(page);
        }
        Ok(collected)
    }

    /// A lazy stream over every item of every page.
    ///
    /// Each page is yielded item by item; the following page is fetched
    /// when the current one runs out, until a fetch returns empty.
    pub fn into_stream(self) -> impl Stream<Item = Result<T>> + Send + 'a
    where
        T: Send + 'a,
    {
        stream::try_unfold(
            (self, VecDeque::new()),
            |(mut pager, mut ready): (Pager<'a, T>, VecDeque<T>)| async move {
                loop {
                    if let Some(item) = ready.pop_front() {
                        return Ok(Some((item, (pager, ready))));
                    }
                    if pager.items.is_empty() {
                        return Ok(None);
                    }
                    ready = VecDeque::from(pager.step().await?);
                }
            },
        )
    }
}

impl<T> Index<usize> for Pager<'_, T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<'p, 'a, T> IntoIterator for &'p Pager<'a, T> {
    type Item = &'p T;
    type IntoIter = std::slice::Iter<'p, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> std::fmt::Debug for Pager<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pager")
            .field("params", &self.params)
            .field("len", &self.items.len())
            .finish_non_exhaustive()
    }
}
