//! Regex based router, turns request path into a typed route
use regex::Regex;

type ParamsConverter<R> = Fn(Vec<&str>) -> Option<R> + Send + Sync;

/// Routes are tested in the order of adding, the first match wins
pub struct RouteParser<R> {
    regex_and_converters: Vec<(Regex, Box<ParamsConverter<R>>)>,
}

impl<R> Default for RouteParser<R> {
    fn default() -> Self {
        Self {
            regex_and_converters: Vec::new(),
        }
    }
}

impl<R> RouteParser<R> {
    /// Adds route without params, e.g. `^/supermarkets$`
    pub fn add_route<F>(&mut self, regex_pattern: &str, f: F) -> &mut Self
    where
        F: Fn() -> R + Send + Sync + 'static,
    {
        self.add_route_with_params(regex_pattern, move |_| Some(f()))
    }

    /// Adds route with params captured by regex groups, e.g. `^/products/(\d+)$`
    pub fn add_route_with_params<F>(&mut self, regex_pattern: &str, converter: F) -> &mut Self
    where
        F: Fn(Vec<&str>) -> Option<R> + Send + Sync + 'static,
    {
        let regex = Regex::new(regex_pattern).unwrap_or_else(|e| panic!("Invalid route pattern {}: {}", regex_pattern, e));
        self.regex_and_converters.push((regex, Box::new(converter) as Box<ParamsConverter<R>>));
        self
    }

    /// Returns route for the path if any
    pub fn test(&self, route: &str) -> Option<R> {
        self.regex_and_converters.iter().filter_map(|&(ref regex, ref converter)| {
            regex.captures(route).and_then(|captures| {
                let params = captures
                    .iter()
                    .skip(1)
                    .filter_map(|capture| capture.map(|capture| capture.as_str()))
                    .collect::<Vec<&str>>();
                converter(params)
            })
        }).next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum TestRoute {
        Items,
        Item(i32),
    }

    #[test]
    fn test_routes() {
        let mut router = RouteParser::default();
        router.add_route(r"^/items$", || TestRoute::Items);
        router.add_route_with_params(r"^/items/(\d+)$", |params| {
            params.get(0).and_then(|id| id.parse().ok()).map(TestRoute::Item)
        });

        assert_eq!(router.test("/items"), Some(TestRoute::Items));
        assert_eq!(router.test("/items/12"), Some(TestRoute::Item(12)));
        assert_eq!(router.test("/items/abc"), None);
        assert_eq!(router.test("/items/99999999999"), None);
    }
}
