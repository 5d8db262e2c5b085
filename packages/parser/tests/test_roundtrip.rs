use sprout_parser::{parse, print};

fn assert_roundtrip(source: &str) {
    let program = match parse(source) {
        Ok(program) => program,
        Err(e) => panic!("Parse error: {:?}\n{}", e, source),
    };
    assert_eq!(print(source, &program), source);
}

#[test]
fn test_vite_config() {
    assert_roundtrip(
        r#"import { fileURLToPath, URL } from 'node:url'

import { defineConfig } from 'vite'
import vue from '@vitejs/plugin-vue'
import vueJsx from '@vitejs/plugin-vue-jsx'

// https://vitejs.dev/config/
export default defineConfig({
  plugins: [
    vue(),
    vueJsx(),
  ],
  resolve: {
    alias: {
      '@': fileURLToPath(new URL('./src', import.meta.url))
    }
  }
})
"#,
    );
}

#[test]
fn test_react_entry() {
    assert_roundtrip(
        r#"import React from 'react'
import ReactDOM from 'react-dom/client'
import App from './App.tsx'
import './index.css'

ReactDOM.createRoot(document.getElementById('root')!).render(
  <React.StrictMode>
    <App />
  </React.StrictMode>,
)
"#,
    );
}

#[test]
fn test_vue_entry() {
    assert_roundtrip(
        r#"import './assets/main.css'

import { createApp } from 'vue'
import { createPinia } from 'pinia'

import App from './App.vue'
import router from './router'

const app = createApp(App)

app.use(createPinia())
app.use(router)

app.mount('#app')
"#,
    );
}

#[test]
fn test_typescript_module() {
    assert_roundtrip(
        r#"import type { Plugin } from 'vite';

export interface Options {
    include?: string[];
    exclude?: RegExp | null;
}

type Hook = (id: string) => Promise<void> | void;

export enum Mode { Dev = 'dev', Prod = 'prod' }

export function plugin(options: Options = {}): Plugin {
    const seen = new Map<string, number>();
    return {
        name: 'example',
        async transform(code, id) {
            if (!id.endsWith('.ts')) return;
            seen.set(id, (seen.get(id) ?? 0) + 1);
            return { code: `/* ${id} */\n${code}`, map: null };
        },
    } satisfies Plugin;
}
"#,
    );
}

#[test]
fn test_classes_and_control_flow() {
    assert_roundtrip(
        r#"export class Queue<T> extends Base implements Iterable<T> {
  private items: T[] = []
  static #count = 0

  constructor(private readonly name: string) {
    super()
  }

  *[Symbol.iterator]() {
    for (const item of this.items) yield item
  }

  get size() {
    return this.items.length
  }
}

outer: for (let i = 0; i < 10; i++) {
  switch (i % 3) {
    case 0:
      continue outer
    default:
      break
  }
}

try {
  risky()
} catch (err) {
  console.error(err)
} finally {
  done()
}

do { tick() } while (pending > 0)
"#,
    );
}

#[test]
fn test_jsx_component() {
    assert_roundtrip(
        r#"export default function App({ items }: Props) {
  const [count, setCount] = useState(0)
  return (
    <>
      {/* header */}
      <Header title="Hello" onClick={() => setCount(count + 1)} {...rest} />
      <ul className='list'>
        {items.map((item) => <li key={item.id}>{item.label} &amp; more</li>)}
      </ul>
    </>
  )
}
"#,
    );
}

#[test]
fn test_expressions_and_regex() {
    assert_roundtrip(
        r#"const pattern = /^[a-z/]+$/i
const ratio = total / count / 2
const value = a?.b?.[c] ?? ((d || e) && !f)
const big = 10n ** 2n
let x = y = z += 1
const tagged = html`<div>${content}</div>`
const nested = `outer ${`inner ${deep}`}`
label: {
  break label
}
"#,
    );
}

#[test]
fn test_block_comments() {
    // leading license header
    assert_roundtrip("/**\n * License: MIT\n */\nimport a from 'a'\n");
    // trailing
    assert_roundtrip("x /* a */\n");
    // inline, inside lists and between tokens
    assert_roundtrip(
        "export default defineConfig({\n  build: {\n    target: \"es2015\", /* legacy browsers */\n  },\n  plugins: [/* none yet */],\n})\n",
    );
    assert_roundtrip("const y = /* before */ f(/* arg */ 1) /* after */;\n");
}

#[test]
fn test_class_members_without_modifiers() {
    assert_roundtrip("class A { m() {} }\n");
    assert_roundtrip("class A { x = 1 }\n");
    assert_roundtrip("class A {\n  #p = 1\n  static m() {}\n}\n");
}
