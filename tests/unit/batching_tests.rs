/*!
 * Tests for batch partitioning and the batch translation engine
 */

use proptest::prelude::*;

use gettext_cloud_translator::providers::mock::MockProvider;
use gettext_cloud_translator::translation::batch::{partition, text_len};
use gettext_cloud_translator::translation::{BatchLimits, BatchTranslator, RetryPolicy};

fn texts_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zäöü ]{0,40}", 0..80)
}

proptest! {
    /// Batches cover the input exactly once, in order
    #[test]
    fn test_partition_withArbitraryInput_shouldCoverEveryIndexInOrder(
        texts in texts_strategy(),
        max_items in 1usize..20,
        max_chars in 1usize..120,
    ) {
        let batches = partition(&texts, BatchLimits::new(max_items, max_chars));

        let mut expected_start = 0;
        for range in &batches {
            prop_assert_eq!(range.start, expected_start);
            prop_assert!(range.end > range.start);
            expected_start = range.end;
        }
        prop_assert_eq!(expected_start, texts.len());
    }

    /// Every batch respects both limits unless it is a single oversized string
    #[test]
    fn test_partition_withArbitraryInput_shouldRespectLimits(
        texts in texts_strategy(),
        max_items in 1usize..20,
        max_chars in 1usize..120,
    ) {
        let limits = BatchLimits::new(max_items, max_chars);

        for range in partition(&texts, limits) {
            let batch = &texts[range];
            let chars: usize = batch.iter().map(|text| text_len(text)).sum();

            prop_assert!(batch.len() <= limits.max_items);
            if batch.len() > 1 {
                prop_assert!(chars <= limits.max_chars);
            }
        }
    }

    /// The engine answers every request with one aligned slot per input
    #[test]
    fn test_translateAll_withArbitraryInput_shouldPreserveLengthAndOrder(
        texts in texts_strategy(),
        max_items in 1usize..20,
        concurrency in 1usize..4,
    ) {
        let provider = MockProvider::intermittent(3);
        let translator = BatchTranslator::new(&provider, BatchLimits::new(max_items, 500), RetryPolicy::no_retry())
            .with_concurrency(concurrency);

        let pairs = tokio_test::block_on(translator.translate_all(&texts, "en", "de", |_, _| {}));

        prop_assert_eq!(pairs.len(), texts.len());
        for (pair, source) in pairs.iter().zip(&texts) {
            prop_assert_eq!(&pair.source, source);
        }
    }
}

/// 120 strings with 50 per batch go out as 50, 50 and 20
#[tokio::test]
async fn test_translateAll_withFailingMiddleBatch_shouldOnlyLoseThatBatch() {
    let texts: Vec<String> = (0..120).map(|i| format!("entry {}", i)).collect();
    let provider = MockProvider::working().failing_when(|batch| batch.iter().any(|text| text == "entry 50"));
    let translator = BatchTranslator::new(&provider, BatchLimits::new(50, usize::MAX), RetryPolicy::no_retry());

    let pairs = translator.translate_all(&texts, "en", "de", |_, _| {}).await;

    assert_eq!(provider.batch_sizes(), vec![50, 50, 20]);
    assert!(pairs[..50].iter().all(|pair| pair.is_translated()));
    assert!(pairs[50..100].iter().all(|pair| !pair.is_translated()));
    assert!(pairs[100..].iter().all(|pair| pair.is_translated()));
}

/// A failing batch is attempted as often as the retry policy allows
#[tokio::test]
async fn test_translateAll_withRetries_shouldRepeatFailedBatch() {
    let texts: Vec<String> = (0..4).map(|i| format!("entry {}", i)).collect();
    let provider = MockProvider::failing();
    let retry = RetryPolicy::new(3, std::time::Duration::ZERO);
    let translator = BatchTranslator::new(&provider, BatchLimits::new(10, 1000), retry);

    let pairs = translator.translate_all(&texts, "en", "de", |_, _| {}).await;

    assert_eq!(provider.call_count(), 3);
    assert!(pairs.iter().all(|pair| pair.translated.is_none()));
}
