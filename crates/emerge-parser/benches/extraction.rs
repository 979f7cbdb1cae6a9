use criterion::{Criterion, criterion_group, criterion_main};
use emerge_core::analysis::Analysis;
use emerge_core::language::LanguageType;
use emerge_core::results::{FileId, FileResult, ResultSet, ScannedFile};
use emerge_parser::comments::filter_source_tokens_without_comments;
use emerge_parser::generate_entity_results_parallel;
use emerge_parser::languages::LanguageRegistry;
use emerge_parser::tokenizer::scan_tokens;
use std::hint::black_box;
use std::sync::Arc;

const SAMPLE_JAVA: &str = r#"
package com.example.accounts;

import java.util.HashMap;
import java.util.List;
import java.util.Map;

/*
 * Account bookkeeping.
 */
public class AccountService {
    private final Map<String, Account> accounts = new HashMap<>();

    // lookups
    public Account find(String id) {
        Account account = accounts.get(id);
        if (account == null) {
            throw new IllegalArgumentException("unknown account " + id);
        }
        return account;
    }

    public void transfer(String from, String to, long amount) {
        Account source = find(from);
        Account target = find(to);
        if (source.balance() < amount) {
            throw new IllegalStateException("insufficient funds");
        }
        source.withdraw(amount);
        target.deposit(amount);
    }

    static class Account {
        private long balance;

        long balance() { return balance; }
        void withdraw(long amount) { balance -= amount; }
        void deposit(long amount) { balance += amount; }
    }
}

interface AccountListener {
    void onTransfer(String from, String to, long amount);
}

enum AccountState { OPEN, FROZEN, CLOSED }
"#;

fn java_file(analysis: &Arc<Analysis>, relative: &str) -> FileResult {
    FileResult::create(
        Arc::clone(analysis),
        ScannedFile {
            scanned_file_name: format!("/bench/{relative}"),
            relative_file_path_to_analysis: relative.to_string(),
            absolute_name: relative.to_string(),
            display_name: relative.to_string(),
            module_name: "accounts".to_string(),
            scanned_by: "java".to_string(),
            scanned_language: Some(LanguageType::Java),
            scanned_tokens: scan_tokens(SAMPLE_JAVA),
        },
    )
    .expect("valid bench file")
}

fn bench_comment_filter(c: &mut Criterion) {
    let registry = LanguageRegistry::builtin().expect("built-in languages");
    let parser = registry.get("java").expect("java parser");
    let tokens = scan_tokens(SAMPLE_JAVA);
    let keywords = parser.grammar().comment_keywords.clone();
    c.bench_function("filter_comments_java", |b| {
        b.iter(|| filter_source_tokens_without_comments(black_box(&tokens), &keywords))
    });
}

fn bench_java_extraction(c: &mut Criterion) {
    let registry = LanguageRegistry::builtin().expect("built-in languages");
    let parser = registry.get("java").expect("java parser");
    let analysis = Analysis::new("bench");
    let file = java_file(&analysis, "AccountService.java");
    c.bench_function("extract_entities_java", |b| {
        b.iter(|| parser.parse(black_box(&file), FileId(0)))
    });
}

fn bench_parallel_extraction(c: &mut Criterion) {
    let registry = LanguageRegistry::builtin().expect("built-in languages");
    let analysis = Analysis::new("bench");
    let mut results = ResultSet::new();
    for i in 0..50 {
        results
            .add_file(java_file(&analysis, &format!("File{i}.java")))
            .expect("unique bench file");
    }

    c.bench_function("extract_files_parallel_50", |b| {
        b.iter(|| generate_entity_results_parallel(black_box(&results), &registry))
    });
}

criterion_group!(
    benches,
    bench_comment_filter,
    bench_java_extraction,
    bench_parallel_extraction,
);
criterion_main!(benches);
