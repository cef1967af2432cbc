//! Integration tests: validator failures through localized bundles into
//! bad-request responses.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::http::StatusCode;
use serde_json::json;
use stagehand_kernel::i18n::{DEFAULT_BUNDLE, LocalizeParams, MessageBundles};
use stagehand_kernel::response::{Body, error_response};
use stagehand_kernel::validation::{ErrorDetailReporter, FALLBACK_MESSAGE, ReporterParams};
use stagehand_kernel::{CmsError, ErrorKind};
use validator::Validate;

const PHRASES: &str = r"
# Field messages
errors.400.signup.email = Enter a valid e-mail address
errors.signup.password = Password must be at least {0} characters
errors.400.defaultEmpty = This field is required
errors.400.default = Check this field
errors.BadRequestError = Please correct the highlighted fields
";

const PHRASES_NB: &str = r"
errors.400.signup.email = Skriv inn en gyldig e-postadresse
errors.400.defaultEmpty = Feltet er påkrevd
";

#[derive(Debug, Validate)]
struct Signup {
    #[validate(length(min = 1))]
    name: String,
    #[validate(email)]
    email: String,
    #[validate(length(min = 8))]
    password: String,
}

#[derive(Debug, Validate)]
struct Form {
    #[validate(nested)]
    signup: Signup,
}

fn bundles() -> MessageBundles {
    let bundles = MessageBundles::new();
    bundles.load_str(DEFAULT_BUNDLE, None, PHRASES);
    bundles.load_str(DEFAULT_BUNDLE, Some("nb"), PHRASES_NB);
    bundles
}

fn form(name: &str, email: &str, password: &str) -> Form {
    Form {
        signup: Signup {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        },
    }
}

#[test]
fn valid_input_passes() {
    let bundles = bundles();
    let reporter = ErrorDetailReporter::new(&bundles);
    reporter
        .validate(&form("Ada", "ada@example.com", "correct horse"))
        .unwrap();
}

#[test]
fn nested_failures_get_cascaded_messages() {
    let bundles = bundles();
    let reporter = ErrorDetailReporter::new(&bundles);

    let err = reporter.validate(&form("", "not-an-email", "short")).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::BadRequest);
    let errors = err.field_errors().unwrap();
    assert_eq!(errors["signup.email"], vec!["Enter a valid e-mail address"]);
    assert_eq!(errors["signup.name"], vec!["This field is required"]);
    // No placeholder values are supplied, so the marker stays.
    assert_eq!(
        errors["signup.password"],
        vec!["Password must be at least {0} characters"]
    );
}

#[test]
fn locale_specific_messages_fall_back_per_key() {
    let bundles = bundles();
    let reporter = ErrorDetailReporter::with_params(
        &bundles,
        ReporterParams {
            i18n_prefix: None,
            localize: LocalizeParams::locale("nb_NO"),
        },
    );

    let err = reporter.validate(&form("", "nope", "long enough")).unwrap_err();
    let errors = err.field_errors().unwrap();
    assert_eq!(errors["signup.email"], vec!["Skriv inn en gyldig e-postadresse"]);
    assert_eq!(errors["signup.name"], vec!["Feltet er påkrevd"]);
    assert!(!errors.contains_key("signup.password"));
}

#[test]
fn custom_prefix_uses_its_own_field_keys() {
    let bundles = MessageBundles::new();
    bundles.insert(DEFAULT_BUNDLE, None, "signup.400.signup.email", "Bad address");
    bundles.insert(DEFAULT_BUNDLE, None, "signup.400", "Signup is invalid");
    let reporter = ErrorDetailReporter::with_params(
        &bundles,
        ReporterParams {
            i18n_prefix: Some("signup".into()),
            localize: LocalizeParams::default(),
        },
    );

    let err = reporter.validate(&form("Ada", "nope", "x")).unwrap_err();
    let errors = err.field_errors().unwrap();
    assert_eq!(errors["signup.email"], vec!["Bad address"]);
    assert_eq!(errors["signup.password"], vec!["Signup is invalid"]);
}

#[test]
fn without_translations_falls_back_to_constant() {
    let bundles = MessageBundles::new();
    let reporter = ErrorDetailReporter::new(&bundles);

    let err = reporter.validate(&form("Ada", "nope", "long enough")).unwrap_err();
    assert_eq!(
        err,
        CmsError::field("signup.email", FALLBACK_MESSAGE)
    );
}

#[test]
fn reported_failures_become_json_bad_request() {
    let bundles = bundles();
    let reporter = ErrorDetailReporter::new(&bundles);
    let err = reporter.validate(&form("Ada", "nope", "long enough")).unwrap_err();

    let res = error_response(&err, &bundles, "errors", true);

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.body,
        Body::Json(json!({
            "message": "Please correct the highlighted fields",
            "errors": {"signup.email": ["Enter a valid e-mail address"]}
        }))
    );
}
