use crate::domain::payment::{Payment, PaymentId};
use crate::domain::ports::PaymentStore;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for payment records, keyed by big-endian id.
pub const CF_PAYMENTS: &str = "payments";
/// Column Family for store metadata (id sequence).
pub const CF_META: &str = "meta";

const NEXT_ID_KEY: &[u8] = b"next_id";

/// A persistent payment store backed by RocksDB.
///
/// Payments are stored as serde_json values under their big-endian id.
/// `create` and `save` run behind a writer mutex so the id sequence and
/// the version compare-and-swap stay atomic; reads go straight to the
/// database. `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDbPaymentStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDbPaymentStore {
    /// Opens or creates a RocksDB instance at the specified path,
    /// ensuring the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_payments = ColumnFamilyDescriptor::new(CF_PAYMENTS, Options::default());
        let cf_meta = ColumnFamilyDescriptor::new(CF_META, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_payments, cf_meta])
            .map_err(|e| PaymentError::Storage(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf_handle(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| PaymentError::Storage(format!("column family {name} not found")))
    }

    fn next_id(&self) -> Result<u64> {
        let cf = self.cf_handle(CF_META)?;
        let next = self
            .db
            .get_cf(cf, NEXT_ID_KEY)
            .map_err(|e| PaymentError::Storage(e.to_string()))?
            .map(|bytes| {
                bytes
                    .try_into()
                    .map(u64::from_be_bytes)
                    .map_err(|_| PaymentError::Storage("corrupt id sequence".to_string()))
            })
            .transpose()?
            .unwrap_or(1);

        self.db
            .put_cf(cf, NEXT_ID_KEY, (next + 1).to_be_bytes())
            .map_err(|e| PaymentError::Storage(e.to_string()))?;
        Ok(next)
    }

    fn put_payment(&self, payment: &Payment) -> Result<()> {
        let cf = self.cf_handle(CF_PAYMENTS)?;
        let value = serde_json::to_vec(payment)
            .map_err(|e| PaymentError::Storage(format!("serialization error: {e}")))?;
        self.db
            .put_cf(cf, payment.id.0.to_be_bytes(), value)
            .map_err(|e| PaymentError::Storage(e.to_string()))
    }

    fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>> {
        let cf = self.cf_handle(CF_PAYMENTS)?;
        let bytes = self
            .db
            .get_cf(cf, id.0.to_be_bytes())
            .map_err(|e| PaymentError::Storage(e.to_string()))?;

        bytes
            .map(|bytes| {
                serde_json::from_slice(&bytes)
                    .map_err(|e| PaymentError::Storage(format!("deserialization error: {e}")))
            })
            .transpose()
    }

    fn collect_active_ids<F>(&self, matches: F) -> Result<Vec<PaymentId>>
    where
        F: Fn(&Payment) -> bool,
    {
        let cf = self.cf_handle(CF_PAYMENTS)?;
        let mut ids = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item.map_err(|e| PaymentError::Storage(e.to_string()))?;
            let payment: Payment = serde_json::from_slice(&value)
                .map_err(|e| PaymentError::Storage(format!("deserialization error: {e}")))?;
            if payment.is_active() && matches(&payment) {
                ids.push(payment.id);
            }
        }
        // Big-endian keys iterate in id order already; keep the
        // guarantee explicit.
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl PaymentStore for RocksDbPaymentStore {
    async fn create(&self, mut payment: Payment) -> Result<Payment> {
        let _guard = self.write_lock.lock().await;
        payment.id = PaymentId(self.next_id()?);
        payment.version = 1;
        self.put_payment(&payment)?;
        Ok(payment)
    }

    async fn find_by_id(&self, id: PaymentId) -> Result<Option<Payment>> {
        self.get_payment(id)
    }

    async fn save(&self, mut payment: Payment) -> Result<Payment> {
        let _guard = self.write_lock.lock().await;
        let current = self
            .get_payment(payment.id)?
            .ok_or(PaymentError::NotFound(payment.id))?;

        if current.version != payment.version {
            return Err(PaymentError::ConcurrentModification(payment.id));
        }

        payment.version += 1;
        self.put_payment(&payment)?;
        Ok(payment)
    }

    async fn active_ids_by_amount(&self, amount: Decimal) -> Result<Vec<PaymentId>> {
        self.collect_active_ids(|payment| payment.amount.value() == amount)
    }

    async fn all_active_ids(&self) -> Result<Vec<PaymentId>> {
        self.collect_active_ids(|_| true)
    }
}
