use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sprout_parser::{parse, print, tokenize};

const VITE_CONFIG: &str = r#"
import { fileURLToPath, URL } from 'node:url'
import { defineConfig } from 'vite'
import vue from '@vitejs/plugin-vue'

export default defineConfig({
  plugins: [vue()],
  resolve: {
    alias: {
      '@': fileURLToPath(new URL('./src', import.meta.url))
    }
  }
})
"#;

fn large_module() -> String {
    let mut source = String::new();
    for i in 0..200 {
        source.push_str(&format!(
            "export function handler{i}(event: Event): number {{\n  const items = [1, 2, 3].map((x) => x * {i})\n  if (items.length > 2) {{\n    return items.reduce((a, b) => a + b, 0)\n  }}\n  return <div className=\"row\">{{items}}</div>\n}}\n\n"
        ));
    }
    source
}

fn parse_config(c: &mut Criterion) {
    c.bench_function("parse_vite_config", |b| {
        b.iter(|| parse(black_box(VITE_CONFIG)))
    });
}

fn parse_large_module(c: &mut Criterion) {
    let source = large_module();
    c.bench_function("parse_large_module", |b| b.iter(|| parse(black_box(&source))));
}

fn print_unchanged(c: &mut Criterion) {
    let source = large_module();
    let program = parse(&source).unwrap();
    c.bench_function("print_unchanged", |b| {
        b.iter(|| print(black_box(&source), black_box(&program)))
    });
}

fn tokenize_only(c: &mut Criterion) {
    let source = large_module();
    c.bench_function("tokenize_large_module", |b| {
        b.iter(|| tokenize(black_box(&source)))
    });
}

criterion_group!(
    benches,
    parse_config,
    parse_large_module,
    print_unchanged,
    tokenize_only
);
criterion_main!(benches);
