//! Dataset sources.
//!
//! A guard re-acquires its dataset on every call. Fixed datasets are shared
//! without copying; producers are invoked exactly once per call and their
//! output is never cached.

use std::sync::Arc;

use crls_core::{BoxError, GuardError, GuardResult};
use tracing::debug;

/// Shared, immutable sequence of records.
pub type Dataset<R> = Arc<[R]>;

/// Synchronous dataset producer.
pub type Producer<R> = Arc<dyn Fn() -> Result<Dataset<R>, BoxError> + Send + Sync>;

/// Where a synchronous guard gets its records.
pub enum DatasetSource<R> {
    /// A fixed dataset shared by every call.
    Fixed(Dataset<R>),
    /// A producer invoked once per call.
    Producer(Producer<R>),
}

impl<R: 'static> DatasetSource<R> {
    /// Use a fixed dataset.
    pub fn fixed(rows: impl Into<Dataset<R>>) -> Self {
        DatasetSource::Fixed(rows.into())
    }

    /// Use an infallible producer.
    pub fn producer<F, D>(producer: F) -> Self
    where
        F: Fn() -> D + Send + Sync + 'static,
        D: Into<Dataset<R>>,
    {
        DatasetSource::Producer(Arc::new(move || -> Result<Dataset<R>, BoxError> {
            Ok(producer().into())
        }))
    }

    /// Use a fallible producer.
    pub fn try_producer<F, D, E>(producer: F) -> Self
    where
        F: Fn() -> Result<D, E> + Send + Sync + 'static,
        D: Into<Dataset<R>>,
        E: Into<BoxError>,
    {
        DatasetSource::Producer(Arc::new(move || -> Result<Dataset<R>, BoxError> {
            producer().map(Into::into).map_err(Into::into)
        }))
    }
}

impl<R> DatasetSource<R> {
    /// Acquire the records for one call.
    pub fn acquire(&self) -> GuardResult<Dataset<R>> {
        match self {
            DatasetSource::Fixed(rows) => Ok(Arc::clone(rows)),
            DatasetSource::Producer(producer) => producer().map_err(|e| {
                debug!(error = %e, "dataset producer failed");
                GuardError::Producer(e)
            }),
        }
    }

    /// Check if the dataset is fixed.
    pub fn is_fixed(&self) -> bool {
        matches!(self, DatasetSource::Fixed(_))
    }
}

impl<R> Clone for DatasetSource<R> {
    fn clone(&self) -> Self {
        match self {
            DatasetSource::Fixed(rows) => DatasetSource::Fixed(Arc::clone(rows)),
            DatasetSource::Producer(producer) => DatasetSource::Producer(Arc::clone(producer)),
        }
    }
}

impl<R> From<Vec<R>> for DatasetSource<R> {
    fn from(rows: Vec<R>) -> Self {
        DatasetSource::Fixed(rows.into())
    }
}

impl<R> From<Dataset<R>> for DatasetSource<R> {
    fn from(rows: Dataset<R>) -> Self {
        DatasetSource::Fixed(rows)
    }
}

#[cfg(feature = "async")]
pub use self::asynchronous::{AsyncProducer, AsyncSource};

#[cfg(feature = "async")]
mod asynchronous {
    use std::future::Future;
    use std::sync::Arc;

    use crls_core::{BoxError, GuardError, GuardResult};
    use futures::future::{BoxFuture, FutureExt};
    use tracing::debug;

    use super::Dataset;

    /// Asynchronous dataset producer.
    pub type AsyncProducer<R> =
        Arc<dyn Fn() -> BoxFuture<'static, Result<Dataset<R>, BoxError>> + Send + Sync>;

    /// Where an asynchronous guard gets its records.
    pub struct AsyncSource<R> {
        producer: AsyncProducer<R>,
    }

    impl<R: 'static> AsyncSource<R> {
        /// Use an infallible asynchronous producer.
        pub fn new<F, Fut, D>(producer: F) -> Self
        where
            F: Fn() -> Fut + Send + Sync + 'static,
            Fut: Future<Output = D> + Send + 'static,
            D: Into<Dataset<R>>,
        {
            Self {
                producer: Arc::new(
                    move || -> BoxFuture<'static, Result<Dataset<R>, BoxError>> {
                        let pending = producer();
                        async move {
                            let rows: Dataset<R> = pending.await.into();
                            Ok(rows)
                        }
                        .boxed()
                    },
                ),
            }
        }

        /// Use a fallible asynchronous producer.
        pub fn try_new<F, Fut, D, E>(producer: F) -> Self
        where
            F: Fn() -> Fut + Send + Sync + 'static,
            Fut: Future<Output = Result<D, E>> + Send + 'static,
            D: Into<Dataset<R>>,
            E: Into<BoxError>,
        {
            Self {
                producer: Arc::new(
                    move || -> BoxFuture<'static, Result<Dataset<R>, BoxError>> {
                        let pending = producer();
                        async move {
                            let result: Result<Dataset<R>, BoxError> =
                                pending.await.map(Into::into).map_err(Into::into);
                            result
                        }
                        .boxed()
                    },
                ),
            }
        }

        /// Use an already boxed producer.
        pub fn from_producer(producer: AsyncProducer<R>) -> Self {
            Self { producer }
        }
    }

    impl<R> AsyncSource<R> {
        /// Acquire the records for one call.
        pub async fn acquire(&self) -> GuardResult<Dataset<R>> {
            (self.producer)().await.map_err(|e| {
                debug!(error = %e, "async dataset producer failed");
                GuardError::Producer(e)
            })
        }
    }

    impl<R> Clone for AsyncSource<R> {
        fn clone(&self) -> Self {
            Self {
                producer: Arc::clone(&self.producer),
            }
        }
    }
}
