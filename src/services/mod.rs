pub mod mapper;

pub mod content_form;
pub use content_form::FormState;

pub mod watch_service;
pub use watch_service::{WatchError, WatchService, WatchSets};

pub mod watch_service_impl;
pub use watch_service_impl::SeaOrmWatchService;

pub mod catalog_service;
pub use catalog_service::{
    CastMember, CatalogError, CatalogService, ContentDetail, Person, PersonCredit, PopularItem,
    SearchResult, SeasonSummary,
};

pub mod catalog_service_impl;
pub use catalog_service_impl::TmdbCatalogService;

pub mod backfill;
pub use backfill::BackfillReport;
