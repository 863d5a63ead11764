use gqlclientgen::{ClientConfig, Operation, OperationKind};
use gqlclientgen_test_client::countries::{
    CountriesClient, CountryStatus, GetCountryOperation, GetCountryRequest, GetCountryResponse,
    ListCountriesRequest, ListCountriesResponse, RenameCountryOperation, RenameCountryResponse,
};
use serde_json::json;

#[test]
fn deserializes_nested_response() {
    let payload = json!({
        "country": {
            "code": "DE",
            "name": "Germany",
            "capital": "Berlin",
            "status": "ACTIVE",
            "languages": [
                { "code": "de", "name": "German" }
            ]
        }
    });
    let response: GetCountryResponse = serde_json::from_value(payload).unwrap();
    let country = response.country.unwrap();
    assert_eq!(country.code, "DE");
    assert_eq!(country.name, "Germany");
    assert_eq!(country.capital.as_deref(), Some("Berlin"));
    assert_eq!(country.status, Some(CountryStatus::Active));
    assert_eq!(country.status.map(|status| status.as_str()), Some("ACTIVE"));
    // absent nullable keys decode as none
    assert_eq!(country.updated_at, None);
    assert_eq!(country.languages.len(), 1);
    assert_eq!(country.languages[0].code, "de");
    assert_eq!(country.languages[0].name, "German");

    let missing: GetCountryResponse = serde_json::from_value(json!({ "country": null })).unwrap();
    assert!(missing.country.is_none());
}

#[test]
fn deserializes_lists_and_aliases() {
    let payload = json!({
        "countries": [
            { "code": "AT", "name": "Austria", "continent": { "name": "Europe" } },
            { "code": "JP", "name": "Japan", "continent": { "name": "Asia" } }
        ]
    });
    let response: ListCountriesResponse = serde_json::from_value(payload).unwrap();
    let continents: Vec<&str> = response
        .countries
        .iter()
        .map(|country| country.continent.name.as_str())
        .collect();
    assert_eq!(continents, vec!["Europe", "Asia"]);

    let payload = json!({ "renameCountry": { "code": "AT", "newName": "Österreich" } });
    let response: RenameCountryResponse = serde_json::from_value(payload).unwrap();
    assert_eq!(response.rename_country.unwrap().new_name, "Österreich");
}

#[test]
fn serializes_requests() {
    let request = ListCountriesRequest { filter: None };
    assert_eq!(serde_json::to_value(&request).unwrap(), json!({}));

    let request = GetCountryRequest {
        code: "DE".to_string(),
    };
    assert_eq!(serde_json::to_value(&request).unwrap(), json!({ "code": "DE" }));
}

#[test]
fn operations_carry_their_documents() {
    assert_eq!(GetCountryOperation::NAME, "GetCountry");
    assert_eq!(GetCountryOperation::KIND, OperationKind::Query);
    assert!(GetCountryOperation::QUERY.contains("query GetCountry($code: ID!)"));
    assert!(GetCountryOperation::QUERY.contains("query ListCountries"));
    assert_eq!(RenameCountryOperation::KIND, OperationKind::Mutation);
}

#[test]
fn client_wraps_runtime_client() {
    let client = CountriesClient::new(ClientConfig::new("http://localhost:4000/graphql")).unwrap();
    assert_eq!(client.inner().endpoint().as_str(), "http://localhost:4000/graphql");
    assert!(CountriesClient::new(ClientConfig::new("ftp://localhost/graphql")).is_err());
}
