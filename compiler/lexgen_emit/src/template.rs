//! Fixed grammar blocks around the rule set's definitions and actions.

use std::fmt::Write;

use lexgen_rules::{token_slot, Identifier};

use crate::GrammarFiles;

/// Rough size of the fixed blocks, for preallocation.
pub(crate) const FIXED_SIZE: usize = 4096;

const INCLUDES: &str = r#"%top{
#include <limits.h>
#include <stdio.h>
#include <stdlib.h>
#include <string.h>
#ifdef _WIN32
#include <io.h>
#define dup _dup
#define close _close
#define fdopen _fdopen
#define LEXGEN_EXPORT __declspec(dllexport)
#else
#include <unistd.h>
#define LEXGEN_EXPORT __attribute__((visibility("default")))
#endif
}
"#;

/// Replaces flex's `int yylex(yyscan_t)` so every action can return the
/// token slot of its rule; `NULL` (flex's `YY_NULL`) marks end of input.
const YY_DECL: &str = "#define YY_DECL const char *yylex(yyscan_t yyscanner)\n";

const CATCH_ALL: &str = ".|\\n\t{ /* no rule matched: skip one byte */ }\n";

const SESSION: &str = r"
typedef struct lexgen_session {
    yyscan_t scanner;
    YY_BUFFER_STATE buffer;
    FILE *file;
} lexgen_session;

static lexgen_session *lexgen_session_new(void) {
    lexgen_session *session = calloc(1, sizeof(lexgen_session));
    if (session == NULL) {
        return NULL;
    }
    if (yylex_init(&session->scanner) != 0) {
        free(session);
        return NULL;
    }
    return session;
}

LEXGEN_EXPORT void *scan_file(int fd, const char *mode) {
    int owned = dup(fd);
    if (owned < 0) {
        return NULL;
    }
    FILE *file = fdopen(owned, mode);
    if (file == NULL) {
        close(owned);
        return NULL;
    }
    lexgen_session *session = lexgen_session_new();
    if (session == NULL) {
        fclose(file);
        return NULL;
    }
    session->file = file;
    session->buffer = yy_create_buffer(file, YY_BUF_SIZE, session->scanner);
    return session;
}

LEXGEN_EXPORT void *scan_string(const char *bytes, size_t len) {
    if (len > (size_t) INT_MAX) {
        return NULL;
    }
    lexgen_session *session = lexgen_session_new();
    if (session == NULL) {
        return NULL;
    }
    session->buffer = yy_scan_bytes(bytes, (int) len, session->scanner);
    return session;
}

LEXGEN_EXPORT const char *next_token(void *handle, const char **text, size_t *len) {
    lexgen_session *session = handle;
    yy_switch_to_buffer(session->buffer, session->scanner);
    const char *kind = yylex(session->scanner);
    if (kind == NULL) {
        return NULL;
    }
    *text = yyget_text(session->scanner);
    *len = (size_t) yyget_leng(session->scanner);
    return kind;
}

LEXGEN_EXPORT void free_scanner(void *handle) {
    lexgen_session *session = handle;
    yy_delete_buffer(session->buffer, session->scanner);
    yylex_destroy(session->scanner);
    if (session->file != NULL) {
        fclose(session->file);
    }
    free(session);
}
";

pub(crate) fn write_options(out: &mut String, files: &GrammarFiles) {
    out.push_str("%option reentrant stack noyywrap full 8bit nounput noinput\n");
    let _ = writeln!(
        out,
        "%option outfile=\"{}\" header-file=\"{}\"",
        files.c_source, files.c_header
    );
}

pub(crate) fn write_preamble(out: &mut String, emitting: &[Identifier]) {
    out.push_str(INCLUDES);
    out.push_str("%{\n");
    for name in emitting {
        let _ = writeln!(out, "static const char *{};", token_slot(name));
    }
    out.push_str(YY_DECL);
    out.push_str("%}\n");
}

pub(crate) fn write_catch_all(out: &mut String) {
    out.push_str(CATCH_ALL);
}

pub(crate) fn write_module(out: &mut String, emitting: &[Identifier]) {
    out.push_str(SESSION);
    out.push_str("\nstatic int lexgen_initialized = 0;\n\n");
    out.push_str("LEXGEN_EXPORT void lexgen_init(void) {\n");
    out.push_str("    if (lexgen_initialized) {\n        return;\n    }\n");
    for name in emitting {
        let _ = writeln!(out, "    {} = \"{name}\";", token_slot(name));
    }
    out.push_str("    lexgen_initialized = 1;\n}\n");
}
