pub mod ipfs_http;
pub mod store_interface;

pub use ipfs_http::{IpfsHttpStore, IpfsStoreFactory};
pub use store_interface::{
    AddEntry, AddOptions, ByteStream, ContentStore, ContentStoreFactory, EntryStream, GetOptions,
    StoreEntry, StoreError,
};
