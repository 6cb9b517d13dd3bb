use hyper::Method;
use urlencoding;

use controller::router::RouteParser;
use models::{ProductId, SupermarketId};

/// List of all routes with params for the app
#[derive(Clone, Debug, PartialEq)]
pub enum Route {
    Healthcheck,
    Register,
    Login,
    Me,
    Users,
    Products,
    Product(ProductId),
    ProductsCompare(String),
    BasketCompare,
    Supermarkets,
    Supermarket(SupermarketId),
    SupermarketsStats,
    AdminSupermarkets,
    AdminSupermarket(SupermarketId),
}

pub fn create_route_parser() -> RouteParser<Route> {
    let mut router = RouteParser::default();

    // Healthcheck
    router.add_route(r"^/health$", || Route::Healthcheck);
    router.add_route(r"^/healthcheck$", || Route::Healthcheck);

    // Users routes
    router.add_route(r"^/register$", || Route::Register);
    router.add_route(r"^/login$", || Route::Login);
    router.add_route(r"^/me$", || Route::Me);
    router.add_route(r"^/users$", || Route::Users);

    // Products routes
    router.add_route(r"^/products$", || Route::Products);

    // Products/:id route
    router.add_route_with_params(r"^/products/(\d+)$", |params| {
        params
            .get(0)
            .and_then(|string_id| string_id.parse().ok())
            .map(Route::Product)
    });

    // Products/compare/:barcode route
    router.add_route_with_params(r"^/products/compare/([^/]+)$", |params| {
        params
            .get(0)
            .and_then(|barcode| urlencoding::decode(barcode).ok())
            .map(|barcode| Route::ProductsCompare(barcode.into_owned()))
    });

    // Basket route
    router.add_route(r"^/basket/compare$", || Route::BasketCompare);

    // Supermarkets routes
    router.add_route(r"^/supermarkets$", || Route::Supermarkets);
    router.add_route(r"^/supermarkets/stats$", || Route::SupermarketsStats);

    // Supermarkets/:id route
    router.add_route_with_params(r"^/supermarkets/(\d+)$", |params| {
        params
            .get(0)
            .and_then(|string_id| string_id.parse().ok())
            .map(Route::Supermarket)
    });

    // Admin supermarkets routes
    router.add_route(r"^/admin/supermarkets$", || Route::AdminSupermarkets);
    router.add_route_with_params(r"^/admin/supermarkets/(\d+)$", |params| {
        params
            .get(0)
            .and_then(|string_id| string_id.parse().ok())
            .map(Route::AdminSupermarket)
    });

    router
}

/// Routes served without credentials, every other route requires a bearer token
pub fn is_public(method: &Method, route: &Route) -> bool {
    match (method, route) {
        (&Method::Post, &Route::Register)
        | (&Method::Post, &Route::Login)
        | (&Method::Get, &Route::Healthcheck)
        | (&Method::Get, &Route::Products)
        | (&Method::Get, &Route::Product(_))
        | (&Method::Get, &Route::ProductsCompare(_))
        | (&Method::Get, &Route::Supermarkets)
        | (&Method::Get, &Route::Supermarket(_)) => true,
        _ => false,
    }
}

/// Routes served to admins only
pub fn is_admin_only(route: &Route) -> bool {
    match *route {
        Route::AdminSupermarkets | Route::AdminSupermarket(_) => true,
        _ => false,
    }
}
