//! Unit tests for the verification session state machine

use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::domain::entities::{ContactTarget, PhoneNumber};
use crate::domain::value_objects::{AcceptedNumberTypes, PhoneNumberType};
use crate::errors::{ChannelKind, DomainError};
use crate::services::verification::{
    SessionState, SubmitOutcome, VerificationService, VerificationServiceConfig,
};

use super::mocks::{FixedCodes, MockEmail, MockHook, MockLookup, MockSms, MockVoice};

fn phone_target() -> ContactTarget {
    ContactTarget::phone(PhoneNumber::new("1", "(415) 555-0100")).unwrap()
}

fn service(sms: Arc<MockSms>, codes: &[&str]) -> VerificationService {
    VerificationService::builder(VerificationServiceConfig::default())
        .sms_channel(sms)
        .code_generator(Arc::new(FixedCodes::new(codes)))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_begin_sends_code_and_awaits() {
    let sms = Arc::new(MockSms::new(false));
    let service = service(sms.clone(), &["4821"]);
    let (session, _completion) = service.start(phone_target());

    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.begin().await, SessionState::AwaitingCode);

    let sent = sms.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "+14155550100");
    assert_eq!(sent[0].1, "4821 is your  verification code.");
}

#[tokio::test]
async fn test_begin_twice_is_a_no_op() {
    let sms = Arc::new(MockSms::new(false));
    let service = service(sms.clone(), &["4821", "9999"]);
    let (session, _completion) = service.start(phone_target());

    session.begin().await;
    assert_eq!(session.begin().await, SessionState::AwaitingCode);
    assert_eq!(sms.send_count(), 1);
    assert_eq!(session.submit("4821"), SubmitOutcome::Confirmed(phone_target()));
}

#[tokio::test]
async fn test_matching_code_confirms_and_completes() {
    let sms = Arc::new(MockSms::new(false));
    let service = service(sms, &["1234"]);
    let (session, mut completion) = service.start(phone_target());

    session.begin().await;
    assert_eq!(session.submit("1234"), SubmitOutcome::Confirmed(phone_target()));
    assert_eq!(session.state(), SessionState::Confirmed);

    let outcome = completion.outcome().await.unwrap().unwrap();
    assert_eq!(outcome, phone_target());
}

#[tokio::test]
async fn test_wrong_length_is_not_compared() {
    let sms = Arc::new(MockSms::new(false));
    let service = service(sms, &["1234"]);
    let (session, mut completion) = service.start(phone_target());

    session.begin().await;
    assert_eq!(session.submit("123"), SubmitOutcome::Incomplete);
    assert_eq!(session.submit("12345"), SubmitOutcome::Incomplete);
    assert_eq!(session.submit(""), SubmitOutcome::Incomplete);
    assert_eq!(session.state(), SessionState::AwaitingCode);
    assert!(completion.try_outcome().is_none());
}

#[tokio::test]
async fn test_mismatch_keeps_awaiting() {
    let sms = Arc::new(MockSms::new(false));
    let service = service(sms, &["1234"]);
    let (session, mut completion) = service.start(phone_target());

    session.begin().await;
    assert_eq!(session.submit("0000"), SubmitOutcome::Mismatch);
    assert_eq!(session.state(), SessionState::AwaitingCode);
    assert!(completion.try_outcome().is_none());

    assert!(session.submit("1234").is_confirmed());
}

#[tokio::test]
async fn test_submit_before_send_is_ignored() {
    let sms = Arc::new(MockSms::new(false));
    let service = service(sms, &["1234"]);
    let (session, _completion) = service.start(phone_target());

    assert_eq!(session.submit("1234"), SubmitOutcome::NotAwaiting);
    assert_eq!(session.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_delivery_failure_fails_session_once() {
    let sms = Arc::new(MockSms::new(true));
    let service = service(sms, &["1234"]);
    let (session, mut completion) = service.start(phone_target());

    assert_eq!(session.begin().await, SessionState::Failed);
    assert_eq!(session.submit("1234"), SubmitOutcome::NotAwaiting);

    let failure = session.last_failure().unwrap();
    assert_eq!(failure.code, "DELIVERY_FAILED");

    match completion.outcome().await {
        Some(Err(DomainError::DeliveryFailed { channel, .. })) => {
            assert_eq!(channel, ChannelKind::Sms)
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_resend_regenerates_code() {
    let sms = Arc::new(MockSms::new(false));
    let service = service(sms.clone(), &["1111", "2222"]);
    let (session, mut completion) = service.start(phone_target());

    session.begin().await;
    assert_eq!(session.resend().await, SessionState::AwaitingCode);
    assert_eq!(sms.send_count(), 2);

    assert_eq!(session.submit("1111"), SubmitOutcome::Mismatch);
    assert!(session.submit("2222").is_confirmed());
    assert!(completion.outcome().await.unwrap().is_ok());
    assert_eq!(session.snapshot().sends, 2);
}

#[tokio::test]
async fn test_resend_recovers_from_failure() {
    let sms = Arc::new(MockSms::new(true));
    let service = service(sms.clone(), &["1111", "2222"]);
    let (session, mut completion) = service.start(phone_target());

    assert_eq!(session.begin().await, SessionState::Failed);

    sms.should_fail.store(false, Ordering::SeqCst);
    assert_eq!(session.resend().await, SessionState::AwaitingCode);
    assert!(session.last_failure().is_none());

    assert!(matches!(
        completion.outcome().await,
        Some(Err(DomainError::DeliveryFailed { .. }))
    ));
    assert!(completion.try_outcome().is_none());

    assert_eq!(session.submit("2222"), SubmitOutcome::Confirmed(phone_target()));
    assert_eq!(completion.outcome().await.unwrap().unwrap(), phone_target());
    assert!(completion.outcome().await.is_none());
}

#[tokio::test]
async fn test_each_failed_send_is_reported() {
    let sms = Arc::new(MockSms::new(true));
    let service = service(sms.clone(), &["1111", "2222", "3333"]);
    let (session, mut completion) = service.start(phone_target());

    assert_eq!(session.begin().await, SessionState::Failed);
    assert_eq!(session.resend().await, SessionState::Failed);

    for _ in 0..2 {
        assert!(matches!(
            completion.try_outcome(),
            Some(Err(DomainError::DeliveryFailed { .. }))
        ));
    }
    assert!(completion.try_outcome().is_none());

    sms.should_fail.store(false, Ordering::SeqCst);
    assert_eq!(session.resend().await, SessionState::AwaitingCode);
    assert!(session.submit("3333").is_confirmed());
    assert!(completion.outcome().await.unwrap().is_ok());
}

#[tokio::test]
async fn test_resend_from_idle_is_a_no_op() {
    let sms = Arc::new(MockSms::new(false));
    let service = service(sms.clone(), &["1111"]);
    let (session, _completion) = service.start(phone_target());

    assert_eq!(session.resend().await, SessionState::Idle);
    assert_eq!(sms.send_count(), 0);
}

#[tokio::test]
async fn test_cancel_abandons_completion() {
    let sms = Arc::new(MockSms::new(false));
    let service = service(sms, &["1234"]);
    let (session, mut completion) = service.start(phone_target());

    session.begin().await;
    assert!(session.cancel());
    assert_eq!(session.state(), SessionState::Cancelled);
    assert_eq!(session.submit("1234"), SubmitOutcome::NotAwaiting);
    assert!(!session.cancel());

    assert!(completion.outcome().await.is_none());
}

#[tokio::test]
async fn test_cancel_after_confirm_is_rejected() {
    let sms = Arc::new(MockSms::new(false));
    let service = service(sms, &["1234"]);
    let (session, _completion) = service.start(phone_target());

    session.begin().await;
    session.submit("1234");
    assert!(!session.cancel());
    assert_eq!(session.state(), SessionState::Confirmed);
}

#[tokio::test]
async fn test_dropping_session_abandons_completion() {
    let sms = Arc::new(MockSms::new(false));
    let service = service(sms, &["1234"]);
    let (session, mut completion) = service.start(phone_target());

    session.begin().await;
    drop(session);
    assert!(completion.outcome().await.is_none());
}

#[tokio::test]
async fn test_submit_during_resend_sees_new_code_only() {
    let sms = Arc::new(MockSms::new(false));
    let service = service(sms.clone(), &["1111", "2222"]);
    let (session, mut completion) = service.start(phone_target());
    let session = Arc::new(session);

    session.begin().await;
    sms.gated.store(true, Ordering::SeqCst);

    let resend = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.resend().await }
    });
    sms.entered.notified().await;

    assert_eq!(session.state(), SessionState::AwaitingCode);
    assert_eq!(session.submit("1111"), SubmitOutcome::Mismatch);
    assert!(session.submit("2222").is_confirmed());

    sms.release.notify_one();
    assert_eq!(resend.await.unwrap(), SessionState::Confirmed);
    assert!(completion.outcome().await.unwrap().is_ok());
}

#[tokio::test]
async fn test_stale_failure_does_not_override_newer_send() {
    let sms = Arc::new(MockSms::new(false));
    let service = service(sms.clone(), &["1111", "2222", "3333"]);
    let (session, mut completion) = service.start(phone_target());
    let session = Arc::new(session);

    session.begin().await;

    sms.should_fail.store(true, Ordering::SeqCst);
    sms.gated.store(true, Ordering::SeqCst);
    let stale = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.resend().await }
    });
    sms.entered.notified().await;

    sms.should_fail.store(false, Ordering::SeqCst);
    sms.gated.store(false, Ordering::SeqCst);
    assert_eq!(session.resend().await, SessionState::AwaitingCode);

    sms.release.notify_one();
    assert_eq!(stale.await.unwrap(), SessionState::AwaitingCode);
    assert!(completion.try_outcome().is_none());
    assert!(session.submit("3333").is_confirmed());
}

#[tokio::test]
async fn test_cancel_during_send_discards_result() {
    let sms = Arc::new(MockSms::new(false));
    sms.gated.store(true, Ordering::SeqCst);
    let service = service(sms.clone(), &["1111"]);
    let (session, mut completion) = service.start(phone_target());
    let session = Arc::new(session);

    let begin = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.begin().await }
    });
    sms.entered.notified().await;
    assert_eq!(session.state(), SessionState::Sending);
    assert!(session.cancel());

    sms.release.notify_one();
    assert_eq!(begin.await.unwrap(), SessionState::Cancelled);
    // The in-flight send still went out
    assert_eq!(sms.send_count(), 1);
    assert!(completion.outcome().await.is_none());
}

#[tokio::test]
async fn test_hook_rejection_fails_without_sending() {
    let sms = Arc::new(MockSms::new(false));
    let service = VerificationService::builder(VerificationServiceConfig::default())
        .sms_channel(sms.clone())
        .validation_hook(Arc::new(MockHook::Decline))
        .build()
        .unwrap();
    let (session, mut completion) = service.start(phone_target());

    assert_eq!(session.begin().await, SessionState::Failed);
    assert_eq!(sms.send_count(), 0);
    assert!(matches!(
        completion.outcome().await,
        Some(Err(DomainError::ValidationRejected))
    ));
}

#[tokio::test]
async fn test_hook_error_is_reported() {
    let sms = Arc::new(MockSms::new(false));
    let service = VerificationService::builder(VerificationServiceConfig::default())
        .sms_channel(sms.clone())
        .validation_hook(Arc::new(MockHook::Fail))
        .build()
        .unwrap();
    let (session, mut completion) = service.start(phone_target());

    session.begin().await;
    assert_eq!(sms.send_count(), 0);
    match completion.outcome().await {
        Some(Err(DomainError::ValidationFailed { source })) => {
            assert!(source.to_string().contains("unreachable"))
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_restricted_types_with_unaccepted_lookup() {
    let sms = Arc::new(MockSms::new(false));
    let lookup = Arc::new(MockLookup::answering(Some("landline")));
    let config = VerificationServiceConfig {
        accepted_number_types: AcceptedNumberTypes::only([PhoneNumberType::Mobile]),
        ..Default::default()
    };
    let service = VerificationService::builder(config)
        .sms_channel(sms.clone())
        .number_type_lookup(lookup.clone())
        .build()
        .unwrap();
    let (session, mut completion) = service.start(phone_target());

    assert_eq!(session.begin().await, SessionState::Failed);
    assert_eq!(lookup.call_count(), 1);
    assert_eq!(sms.send_count(), 0);
    match completion.outcome().await {
        Some(Err(DomainError::IneligibleNumberType { number_type })) => {
            assert_eq!(number_type, "landline")
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_session_override_of_accepted_types() {
    let sms = Arc::new(MockSms::new(false));
    let lookup = Arc::new(MockLookup::answering(Some("voip")));
    let service = VerificationService::builder(VerificationServiceConfig::default())
        .sms_channel(sms.clone())
        .number_type_lookup(lookup.clone())
        .build()
        .unwrap();

    let (session, _completion) = service.start_with_types(
        phone_target(),
        AcceptedNumberTypes::only([PhoneNumberType::Mobile, PhoneNumberType::Voip]),
    )
    .unwrap();
    assert_eq!(session.begin().await, SessionState::AwaitingCode);
    assert_eq!(lookup.call_count(), 1);
    assert_eq!(sms.send_count(), 1);
}

#[tokio::test]
async fn test_restricted_override_without_lookup_is_refused() {
    let sms = Arc::new(MockSms::new(false));
    let service = service(sms.clone(), &["1111"]);

    let result = service.start_with_types(
        phone_target(),
        AcceptedNumberTypes::only([PhoneNumberType::Mobile]),
    );
    match result {
        Err(DomainError::MisconfiguredChannel { channel }) => {
            assert_eq!(channel, ChannelKind::NumberTypeLookup.as_str())
        }
        Err(other) => panic!("unexpected error: {:?}", other),
        Ok(_) => panic!("restricted session started without a lookup"),
    }
    assert_eq!(sms.send_count(), 0);

    let (session, _completion) = service
        .start_with_types(phone_target(), AcceptedNumberTypes::all())
        .unwrap();
    assert_eq!(session.begin().await, SessionState::AwaitingCode);
}

#[tokio::test]
async fn test_voice_call_reads_current_code() {
    let sms = Arc::new(MockSms::new(false));
    let voice = Arc::new(MockVoice::new(false));
    let service = VerificationService::builder(VerificationServiceConfig::default())
        .sms_channel(sms)
        .voice_channel(voice.clone())
        .code_generator(Arc::new(FixedCodes::new(&["5678", "0000"])))
        .build()
        .unwrap();
    let (session, _completion) = service.start(phone_target());

    session.begin().await;
    session.request_voice_call().await.unwrap();

    let calls = voice.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "+14155550100");
    assert!(calls[0].1.contains("5, 6, 7, 8"));
    assert_eq!(session.state(), SessionState::AwaitingCode);
    assert!(session.submit("5678").is_confirmed());
}

#[tokio::test]
async fn test_voice_call_errors_return_to_caller() {
    let sms = Arc::new(MockSms::new(false));
    let service = VerificationService::builder(VerificationServiceConfig::default())
        .sms_channel(sms.clone())
        .voice_channel(Arc::new(MockVoice::new(true)))
        .build()
        .unwrap();
    let (session, mut completion) = service.start(phone_target());

    assert!(matches!(
        session.request_voice_call().await,
        Err(DomainError::InvalidState { .. })
    ));

    session.begin().await;
    assert!(matches!(
        session.request_voice_call().await,
        Err(DomainError::DeliveryFailed { channel: ChannelKind::VoiceCall, .. })
    ));
    assert_eq!(session.state(), SessionState::AwaitingCode);
    assert!(completion.try_outcome().is_none());
}

#[tokio::test]
async fn test_voice_call_without_port_is_misconfigured() {
    let sms = Arc::new(MockSms::new(false));
    let service = service(sms, &["1234"]);
    let (session, _completion) = service.start(phone_target());

    session.begin().await;
    assert!(matches!(
        session.request_voice_call().await,
        Err(DomainError::MisconfiguredChannel { .. })
    ));
}

#[tokio::test]
async fn test_email_session_sends_rendered_email() {
    let email = Arc::new(MockEmail::default());
    let config = VerificationServiceConfig {
        from_email_address: Some("verify@acme.test".to_string()),
        ..Default::default()
    };
    let service = VerificationService::builder(config)
        .email_channel(email.clone())
        .code_generator(Arc::new(FixedCodes::new(&["2468"])))
        .build()
        .unwrap();
    let (session, mut completion) = service.start_email("jane@example.com").unwrap();

    assert_eq!(session.begin().await, SessionState::AwaitingCode);
    let sent = email.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "jane@example.com");
    assert_eq!(sent[0].from, "verify@acme.test");
    assert_eq!(sent[0].subject, "Please verify your email");
    assert!(sent[0].text_body.as_deref().unwrap().starts_with("2468"));

    assert!(session.submit("2468").is_confirmed());
    let target = completion.outcome().await.unwrap().unwrap();
    assert_eq!(target.as_email(), Some("jane@example.com"));
}

#[tokio::test]
async fn test_voice_call_on_email_target_is_rejected() {
    let email = Arc::new(MockEmail::default());
    let config = VerificationServiceConfig {
        from_email_address: Some("verify@acme.test".to_string()),
        ..Default::default()
    };
    let service = VerificationService::builder(config)
        .email_channel(email)
        .voice_channel(Arc::new(MockVoice::new(false)))
        .build()
        .unwrap();
    let (session, _completion) = service.start_email("jane@example.com").unwrap();

    session.begin().await;
    assert!(matches!(
        session.request_voice_call().await,
        Err(DomainError::InvalidContact { .. })
    ));
}

#[tokio::test]
async fn test_snapshot_tracks_sends() {
    let sms = Arc::new(MockSms::new(false));
    let service = service(sms, &["1111", "2222"]);
    let (session, _completion) = service.start(phone_target());

    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, SessionState::Idle);
    assert_eq!(snapshot.sends, 0);
    assert!(snapshot.code_issued_at.is_none());

    session.begin().await;
    session.resend().await;
    let snapshot = session.snapshot();
    assert_eq!(snapshot.id, session.id());
    assert_eq!(snapshot.sends, 2);
    assert!(snapshot.code_issued_at.is_some());
    assert_eq!(snapshot.target, phone_target());
}
