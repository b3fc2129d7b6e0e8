//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    api::{catalog, children, circulation, health, import, isbn, reader},
    tenant::ORG_HEADER,
};

/// Declares the organization header every scoped route requires
struct OrganizationHeader;

impl Modify for OrganizationHeader {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "organization",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(ORG_HEADER))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storyshelf API",
        version = "1.0.0",
        description = "Classroom library circulation REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&OrganizationHeader),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Children
        children::list_children,
        children::create_child,
        children::get_child,
        children::update_child,
        children::delete_child,
        // Circulation
        circulation::checkout,
        circulation::return_loan,
        circulation::list_loans,
        circulation::get_loan,
        // Reader
        reader::reader_lookup,
        reader::create_journal_entry,
        // Catalog
        catalog::list_books,
        catalog::create_book,
        catalog::get_book,
        catalog::delete_book,
        catalog::list_copies,
        catalog::create_copy,
        catalog::set_copy_status,
        catalog::delete_copy,
        catalog::catalogue,
        catalog::list_locations,
        catalog::create_location,
        import::import_csv,
        isbn::lookup_isbn,
    ),
    components(
        schemas(
            // Children
            crate::models::child::Child,
            crate::models::child::CreateChild,
            crate::models::child::UpdateChild,
            // Circulation
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            crate::models::loan::LoanFilter,
            crate::models::loan::CheckoutRequest,
            crate::models::loan::ReturnRequest,
            // Reader
            crate::models::journal::JournalEntry,
            crate::models::journal::JournalEntryWithBook,
            crate::models::journal::ReaderJournal,
            crate::models::journal::CreateJournalEntry,
            // Catalog
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::BookLookup,
            crate::models::book::BookLookupMetadata,
            crate::models::copy::BookCopy,
            crate::models::copy::CopyStatus,
            crate::models::copy::CatalogueEntry,
            crate::models::copy::CreateCopy,
            crate::models::copy::UpdateCopyStatus,
            crate::models::location::Location,
            crate::models::location::CreateLocation,
            crate::models::import_report::CsvImportRequest,
            crate::models::import_report::ImportReport,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
            crate::error::FieldError,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "children", description = "Anonymous child readers"),
        (name = "circulation", description = "Checkout and return"),
        (name = "reader", description = "Reader page and reading journal"),
        (name = "catalog", description = "Books, copies and shelf locations")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
