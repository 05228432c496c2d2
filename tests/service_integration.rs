use std::time::Duration;

use ews_delegate::auth::Credentials;
use ews_delegate::{
    CallOptions, DirectoryEntry, DirectoryLookup, Error, EwsService, HttpTransport,
};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIND_FOLDER_RESPONSE: &str = include_str!("fixtures/find_folder_response.xml");
const FIND_UNREAD_EMAILS_RESPONSE: &str = include_str!("fixtures/find_unread_emails_response.xml");
const CALENDAR_ITEMS_RESPONSE: &str = include_str!("fixtures/calendar_items_response.xml");

const SID: &str = "S-1-5-21-4207368772-811273523-976865563-30274";
const SID_BYTES: [u8; 28] = [
    0x01, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05, 0x15, 0x00, 0x00, 0x00, 0x44, 0x5A, 0xC7, 0xFA,
    0x33, 0x0D, 0x5B, 0x30, 0x1B, 0xC9, 0x39, 0x3A, 0x42, 0x76, 0x00, 0x00,
];

/// "svc:secret"
const BASIC_AUTH: &str = "Basic c3ZjOnNlY3JldA==";
const ENDPOINT: &str = "/EWS/Exchange.asmx";
const FIND_FOLDER_ACTION: &str = "http://schemas.microsoft.com/exchange/services/2006/messages/FindFolder";
const FIND_ITEM_ACTION: &str = "http://schemas.microsoft.com/exchange/services/2006/messages/FindItem";

/// Knows exactly one person, "asdf".
struct StaticDirectory;

impl DirectoryLookup for StaticDirectory {
    fn search(
        &self,
        _base: &str,
        filter: &str,
    ) -> Result<Vec<DirectoryEntry>, Box<dyn std::error::Error + Send + Sync>> {
        if filter == "(&(objectClass=person)(cn=asdf))" {
            Ok(vec![
                DirectoryEntry::new("cn=asdf,ou=people").with_attribute("objectSid", SID_BYTES)
            ])
        } else {
            Ok(Vec::new())
        }
    }
}

fn service(server: &MockServer) -> EwsService<HttpTransport, StaticDirectory> {
    let transport = HttpTransport::new(
        &server.uri(),
        Credentials::new("svc", "secret"),
        Duration::from_secs(5),
    )
    .unwrap()
    .with_server_version("Exchange2010_SP2");
    EwsService::new(transport, StaticDirectory)
        .with_options(CallOptions::with_timeout(Duration::from_secs(5)))
}

fn soap(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/xml; charset=utf-8")
}

async fn mount_find_folder(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("SOAPAction", FIND_FOLDER_ACTION))
        .and(header("authorization", BASIC_AUTH))
        .and(body_string_contains(format!("<t:SID>{}</t:SID>", SID)))
        .and(body_string_contains(r#"<t:Constant Value="Inkorg"/>"#))
        .and(body_string_contains(
            r#"<t:RequestServerVersion Version="Exchange2010_SP2"/>"#,
        ))
        .respond_with(soap(FIND_FOLDER_RESPONSE))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn inbox_unread_count() {
    let server = MockServer::start().await;
    mount_find_folder(&server).await;

    let count = service(&server).fetch_inbox_unread_count("asdf").await.unwrap();
    assert_eq!(count, 17);
}

#[tokio::test]
async fn unread_emails_from_localized_inbox() {
    let server = MockServer::start().await;
    mount_find_folder(&server).await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("SOAPAction", FIND_ITEM_ACTION))
        .and(header("authorization", BASIC_AUTH))
        .and(body_string_contains("IndexedPageItemView"))
        .and(body_string_contains(r#"<t:FolderId Id="AAMkADInbox" ChangeKey="AQAAABYAAAInbox"/>"#))
        .and(body_string_contains(r#"<t:FieldURI FieldURI="message:IsRead"/>"#))
        .respond_with(soap(FIND_UNREAD_EMAILS_RESPONSE))
        .expect(1)
        .mount(&server)
        .await;

    let messages = service(&server).fetch_unread_emails("asdf", 234).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(
        messages[0]
            .from
            .as_ref()
            .and_then(|from| from.mailbox.email_address.as_deref()),
        Some("anna.svensson@example.org")
    );
    assert!(messages.iter().all(|message| message.is_read == Some(false)));
}

#[tokio::test]
async fn calendar_events_in_range() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("SOAPAction", FIND_ITEM_ACTION))
        .and(body_string_contains(
            r#"<m:CalendarView StartDate="2024-03-01T00:00:00Z" EndDate="2024-03-08T00:00:00Z"/>"#,
        ))
        .and(body_string_contains(r#"<t:DistinguishedFolderId Id="calendar"/>"#))
        .respond_with(soap(CALENDAR_ITEMS_RESPONSE))
        .expect(1)
        .mount(&server)
        .await;

    let events = service(&server)
        .fetch_calendar_events(
            "asdf",
            "2024-03-01T00:00:00Z".parse().unwrap(),
            "2024-03-08T00:00:00Z".parse().unwrap(),
        )
        .await
        .unwrap()
        .expect("calendar data");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].location.as_deref(), Some("Room 4"));
}

#[tokio::test]
async fn calendar_without_response_messages_is_no_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(soap(
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><m:FindItemResponse xmlns:m="http://schemas.microsoft.com/exchange/services/2006/messages"><m:ResponseMessages/></m:FindItemResponse></s:Body></s:Envelope>"#,
        ))
        .mount(&server)
        .await;

    let events = service(&server)
        .fetch_calendar_events(
            "asdf",
            "2024-03-01T00:00:00Z".parse().unwrap(),
            "2024-03-02T00:00:00Z".parse().unwrap(),
        )
        .await
        .unwrap();
    assert!(events.is_none());
}

#[tokio::test]
async fn impersonation_fault_is_passed_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(500).set_body_raw(
                r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><s:Fault><faultcode xmlns:a="http://schemas.microsoft.com/exchange/services/2006/types">a:ErrorImpersonateUserDenied</faultcode><faultstring>The account does not have permission to impersonate the requested user.</faultstring><detail><e:ResponseCode xmlns:e="http://schemas.microsoft.com/exchange/services/2006/errors">ErrorImpersonateUserDenied</e:ResponseCode></detail></s:Fault></s:Body></s:Envelope>"#,
                "text/xml; charset=utf-8",
            ),
        )
        .mount(&server)
        .await;

    let err = service(&server).fetch_inbox_unread_count("asdf").await.unwrap_err();
    assert!(
        matches!(err, Error::RemoteProtocolFault { ref code, .. } if code == "ErrorImpersonateUserDenied"),
        "unexpected error: {:?}",
        err
    );
}

#[tokio::test]
async fn rejected_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = service(&server).fetch_inbox_unread_count("asdf").await.unwrap_err();
    assert!(matches!(err, Error::Authentication), "unexpected error: {:?}", err);
}

#[tokio::test]
async fn unexpected_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = service(&server).fetch_inbox_unread_count("asdf").await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus(503)), "unexpected error: {:?}", err);
}

#[tokio::test]
async fn unknown_user_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let err = service(&server).fetch_unread_emails("nobody", 10).await.unwrap_err();
    assert!(matches!(err, Error::IdentityNotFound { .. }));
}
