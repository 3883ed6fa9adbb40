pub mod callback;
pub mod invoice;
pub mod options;
pub mod receipt;

pub use callback::{CallbackError, CallbackPayload};
pub use invoice::{Invoice, InvoiceBuilder, InvoiceId};
pub use options::{Culture, OutSumCurrency};
pub use receipt::{PaymentMethod, PaymentObject, Receipt, ReceiptItem, Sno, Tax, Vat};
