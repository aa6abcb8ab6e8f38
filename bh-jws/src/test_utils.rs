// Copyright (C) 2020-2025  The Blockhouse Technology Limited (TBTL).
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public
// License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Fixtures shared by the unit tests, taken from [RFC7520] ("Examples of
//! Protecting Content Using JSON Object Signing and Encryption").
//!
//! Only the public part of the RFC7520 RSA key is included. The published
//! RSA signatures are therefore only verified, see
//! [`published_rsa_public_jwk`]. The other RSA and EC signatures were
//! produced over the same signing inputs with the private keys below.
//!
//! [RFC7520]: https://datatracker.ietf.org/doc/html/rfc7520

use crate::{json_object, Jwk};

/// The payload of [section 4 of RFC7520].
///
/// [section 4 of RFC7520]: https://datatracker.ietf.org/doc/html/rfc7520#section-4
pub(crate) const COOKBOOK_PAYLOAD: &str = "It’s a dangerous business, Frodo, going out your door. You step onto the road, and if you don't keep your feet, there’s no knowing where you might be swept off to.";

pub(crate) const COOKBOOK_PAYLOAD_B64: &str = "\
SXTigJlzIGEgZGFuZ2Vyb3VzIGJ1c2luZXNzLCBGcm9kbywgZ29pbmcgb3V0IHlvdXIgZG9vci4g\
WW91IHN0ZXAgb250byB0aGUgcm9hZCwgYW5kIGlmIHlvdSBkb24ndCBrZWVwIHlvdXIgZmVldCwg\
dGhlcmXigJlzIG5vIGtub3dpbmcgd2hlcmUgeW91IG1pZ2h0IGJlIHN3ZXB0IG9mZiB0by4";

pub(crate) const HMAC_KID: &str = "018c0ae5-4d9b-471b-bfd6-eef314bc7037";
pub(crate) const RSA_KID: &str = "bilbo.baggins@hobbiton.example";

/// `{"alg":"HS256","kid":"018c0ae5-4d9b-471b-bfd6-eef314bc7037"}`
pub(crate) const HS256_KID_PROTECTED: &str =
    "eyJhbGciOiJIUzI1NiIsImtpZCI6IjAxOGMwYWU1LTRkOWItNDcxYi1iZmQ2LWVlZjMxNGJjNzAzNyJ9";
pub(crate) const HS256_KID_SIGNATURE: &str = "s0h6KThzkfBBBkLspW1h84VsJZFTsPPqMDA7g1Md7p0";

/// `{"alg":"HS256"}`
pub(crate) const HS256_PROTECTED: &str = "eyJhbGciOiJIUzI1NiJ9";
pub(crate) const HS256_SIGNATURE: &str = "bWUSVaxorn7bEF1djytBd0kHv70Ly5pvbomzMWSOr20";

/// HS256 signature with no protected header at all, [section 4.7 of RFC7520].
///
/// [section 4.7 of RFC7520]: https://datatracker.ietf.org/doc/html/rfc7520#section-4.7
pub(crate) const HS256_UNPROTECTED_SIGNATURE: &str = "xuLifqLGiblpv9zBpuZczWhNj1gARaLV3UxvxhJxZuk";

/// `{"alg":"RS256","kid":"bilbo.baggins@hobbiton.example"}`
pub(crate) const RS256_KID_PROTECTED: &str =
    "eyJhbGciOiJSUzI1NiIsImtpZCI6ImJpbGJvLmJhZ2dpbnNAaG9iYml0b24uZXhhbXBsZSJ9";
pub(crate) const RS256_KID_SIGNATURE: &str = "\
DVo8n-X9CawFCAi_dNB-NnZZFcr86DD0gDHiW5gGs6QaTFQQqSsgYvkwLoz6B-X4I2dH0-0XdSBf\
-oI6oJf6PH8M70o9h6cNQJyBQxTUaRKl1OnIluv3Bll4i5HUoDPnZgLI0qFbQeZ5DfxKpG1-1u_r\
84PhgkLZTM9pw-BGOT_IXmiySjZ-FX06PvjAbwFj2YS-knv1_wWfCB21AXbiW-69vabUZoEvh2Xy\
DhNpzd_rhMI8O7d1EJGAjoqKrq3PQAS1sWLeQIjkH-jeFJEaCjfmG9JO5T0do-b-xZSMOsjBBgir\
g9AdRRC9TQDAcFFFbAiL5WeiP47hMqzkMe4UUQ";

/// `{"alg":"RS256"}`
pub(crate) const RS256_PROTECTED: &str = "eyJhbGciOiJSUzI1NiJ9";
pub(crate) const RS256_SIGNATURE: &str = "\
ekcPXYAXN6gdzQv0E_p5eyIVz6VteAlsuWw3gQfik84nQHb05k4T-q81IxVF2t51EY1G4D-00Evy\
AZUS6tQDriAnk45AADsGzabp3K3C01QW7BrMucHjVwprBWF9g88PcgqY5Tta3o1j4JR7k6F-PAh1\
fy2lU6Ic3GSMM33kbum22IkBTIJ5TJdRfsWc1ZQwyKZJ7M-_nTqevLrtyig06wDsrtci5b7CCqr4\
DVtXXvYPYsRwhRbf00F1ANSDVanEjeaba-mAkg5rTRnv1TquvcgXPxK4UCLhKNHp5rihRlgDyZw-\
LxTTelYFtMzjjsID4ywli4TgT-2p8UAOQ5C0UA";

/// RS256 signature of [section 4.1 of RFC7520], over [`RS256_KID_PROTECTED`].
///
/// [section 4.1 of RFC7520]: https://datatracker.ietf.org/doc/html/rfc7520#section-4.1
pub(crate) const PUBLISHED_RS256_SIGNATURE: &str = "\
MRjdkly7_-oTPTS3AXP41iQIGKa80A0ZmTuV5MEaHoxnW2e5CZ5NlKtainoFmKZopdHM1O2U4mwz\
JdQx996ivp83xuglII7PNDi84wnB-BDkoBwA78185hX-Es4JIwmDLJK3lfWRa-XtL0RnltuYv746\
iYTh_qHRD68BNt1uSNCrUCTJDt5aAE6x8wW1Kt9eRo4QPocSadnHXFxnt8Is9UzpERV0ePPQdLuW\
3IS_de3xyIrDaLGdjluPxUAhb6L2aXic1U12podGU0KLUQSE_oI-ZnmKJ3F4uOZDnd6QZWJushZ4\
1Axf_fcIe8u9ipH84ogoree7vjbU5y18kDquDg";

/// `{"alg":"PS384","kid":"bilbo.baggins@hobbiton.example"}`
pub(crate) const PS384_KID_PROTECTED: &str =
    "eyJhbGciOiJQUzM4NCIsImtpZCI6ImJpbGJvLmJhZ2dpbnNAaG9iYml0b24uZXhhbXBsZSJ9";

/// PS384 signature of [section 4.2 of RFC7520].
///
/// [section 4.2 of RFC7520]: https://datatracker.ietf.org/doc/html/rfc7520#section-4.2
pub(crate) const PUBLISHED_PS384_SIGNATURE: &str = "\
cu22eBqkYDKgIlTpzDXGvaFfz6WGoz7fUDcfT0kkOy42miAh2qyBzk1xEsnk2IpN6-tPid6VrklH\
kqsGqDqHCdP6O8TTB5dDDItllVo6_1OLPpcbUrhiUSMxbbXUvdvWXzg-UD8biiReQFlfz28zGWVs\
diNAUf8ZnyPEgVFn442ZdNqiVJRmBqrYRXe8P_ijQ7p8Vdz0TTrxUeT3lm8d9shnr2lfJT8ImUjv\
AA2Xez2Mlp8cBE5awDzT0qI0n6uiP1aCN_2_jLAeQTlqRHtfa64QQSUmFAAjVKPbByi7xho0uTOc\
bH510a6GYmJUAfmWjwZ6oD4ifKo8DYM-X72Eaw";

/// `{"alg":"ES512","kid":"bilbo.baggins@hobbiton.example"}`
pub(crate) const ES512_KID_PROTECTED: &str =
    "eyJhbGciOiJFUzUxMiIsImtpZCI6ImJpbGJvLmJhZ2dpbnNAaG9iYml0b24uZXhhbXBsZSJ9";
pub(crate) const ES512_KID_SIGNATURE: &str = "\
AOTUabvYg38830CT4KWgKhYPMIaecywbgb6NHG9icH1p1-ZzE8bE1MxJrQentlsSOmcgBYwGdRKW\
Pr1UpMrrm7jYAerg-TOl26srNQQK4AuG57cmxc1fcDj633Pwi73wmcfr2ovZwWiLJCiPYq6Guukm\
etprQHaLo8j_XNtWgfPBTLFi";

/// Symmetric key of [section 3.5 of RFC7520].
///
/// [section 3.5 of RFC7520]: https://datatracker.ietf.org/doc/html/rfc7520#section-3.5
pub(crate) fn cookbook_hmac_jwk() -> Jwk {
    json_object!({
        "kty": "oct",
        "kid": HMAC_KID,
        "use": "sig",
        "alg": "HS256",
        "k": "hJtXIZ2uSN5kbQfbtTNWbpdmhkV8FJG-Onbc6mxCcYg",
    })
}

/// Public RSA key of [section 3.3 of RFC7520].
///
/// [section 3.3 of RFC7520]: https://datatracker.ietf.org/doc/html/rfc7520#section-3.3
pub(crate) fn published_rsa_public_jwk() -> Jwk {
    json_object!({
        "kty": "RSA",
        "kid": RSA_KID,
        "use": "sig",
        "n": "\
            n4EPtAOCc9AlkeQHPzHStgAbgs7bTZLwUBZdR8_KuKPEHLd4rHVTeT-O-XV2jRojdNhxJWTD\
            vNd7nqQ0VEiZQHz_AJmSCpMaJMRBSFKrKb2wqVwGU_NsYOYL-QtiWN2lbzcEe6XC0dApr5yd\
            QLrHqkHHig3RBordaZ6Aj-oBHqFEHYpPe7Tpe-OfVfHd1E6cS6M1FZcD1NNLYD5lFHpPI9bT\
            wJlsde3uhGqC0ZCuEHg8lhzwOHrtIQbS0FVbb9k3-tVTU4fg_3L_vniUFAKwuCLqKnS2BYwd\
            q_mzSnbLY7h_qixoR7jig3__kRhuaxwUkRz5iaiQkqgc5gHdrNP5zw",
        "e": "AQAB",
    })
}

/// RSA 2048-bit private key, carrying the `kid` of the RFC7520 RSA key.
pub(crate) fn cookbook_rsa_jwk() -> Jwk {
    json_object!({
        "kty": "RSA",
        "kid": RSA_KID,
        "use": "sig",
        "n": "\
            qUX12FoL6ah7f6iEXKCTy8UZnpxKxhKpRyHzTetnrVbWCrkxgzNbnGadiTVBJd2_x2ayH31z\
            y1T2n11HhpGRQoYe5LI5syItLo6lRLdpg309Mh5MZky42_jHlJEaX8dmCM_4j1AFw7MZT-4o\
            AvIUzeDMbtnLuTYc8VWnrD6566vOcNGPmP90s-qHh4FNwbu27eOnVgKv3pRrAXmphrxvIsRW\
            Pj-ajlW7vi14ngwzl0cFsuu5jnJGCNFaSnvO0CySioIOHtkuCyDDs1YMbgtGpl3LAlR8t0GT\
            Hs8DdU2gzp-ti4b8Jy5jStgYQJiLFRJQg3AxmdY7C1clUWH8ttyOUw",
        "e": "AQAB",
        "d": "\
            DHdZCDJ1fyNH2Rp1iQbQa6jb3qj-_sBgFBuFeh8Ulxj2kXqbEWEGZanO_0xbPGks1wgSpSwN\
            i5N5yDnL6zasPnx3KPuRMUaakjuyIzHoxOTDzX2avcv3r0eOlzvqd9RNCOgcE53els-JVTAi\
            ZTkj3Beqpp1GmiDIl-Npgk9qTNdPFF3enp09LLL8JYTXLodYBs36tivbLBAgOR9phqQch73o\
            5VL7A6qc3I99wb6-l_0YSIodBTUUt2uO6YOVs5bKJ5r1Ja8rq5MGZW2haZcu3x8gCwetvi5-\
            fFnFe_lNnmYYNkrjzBY62TMutbCMB9OhGfZQv8A2BmA1K3P9QsYrEQ",
        "p": "\
            3vuA-hW8bz8i64htZiQpAhsNbWMs_hVTWsUc3GCBuBcMYzN3SA3i5GFYpYi9zPB9tGZdpspa\
            wtDIGb1FaRDKV3CF5TMYhaK0cq-vFKY1F8h7Bur5mtmVJrHWW4RvnBPWPALInxJdOkVtzUtY\
            MuU9wkcMQvxuizBzANFsYEtmrdE",
        "q": "\
            wlaHB-U8MLbHuT9_Amhs1R4MRhY8Vg6P8izXSmAJRa3yNQMZI1dITSE_hnQkge2xCYBoVPGK\
            zNbMXtxE_6lzsd1hWQVoRggC-sXbzf_ebtFDKIquCQsyPGETm_5nY3MDA1k2wsLeNi3NzTSs\
            lqYTXAButvIBunwszj9Y_2EfDuM",
        "dp": "\
            1_hZL-AlpspMFD0LWMblQTjahHxuc5pMJbqM_ZYrjhYk1WBfw9ZPUExJA-uxifHUjwom4wlT\
            ZyW46dU8iUrN8Gr4BMq8kZLJm9s1hJaHDgYLwuOL5sOfht7wc6uOPmmoMm-vyQKMcYgVlaXI\
            Q2NtseIGqkq89utyN_SfN5VQWkE",
        "dq": "\
            cfXJozCi1jIo9pGsih3wTB0dt2_Mm-5YLPxslzmv1kOFt96EPDwvssMffFnZGrPm0BqTk9Q8\
            v5fqKmpir8WPiaq3LjvEhOSn0qR6G9fCeRuPlVOVcMo3AD8w_5X0zNWh27HSMe2R3xWHDKGp\
            34Gt8pJyWieaKeAtahituLwcOV8",
        "qi": "\
            hX7mhY_PWjxlzVv_7aMQ8K_YMaQSPwUuJevsPFMhwAVGQWUE8Ph7eMUgYgjS8EAm1SmKEv7H\
            kLPQAaou_-ZNh_436oPzSK6t8dNQVaqco097O_yJCSd-XyIlWQEHZDHhKcMsKHZ3ChNWgH0s\
            5i7zIrDTToIvxFaSQYkrKDvwZc8",
    })
}

/// P-521 private key, carrying the `kid` of the RFC7520 EC key.
pub(crate) fn cookbook_ec_jwk() -> Jwk {
    json_object!({
        "kty": "EC",
        "kid": RSA_KID,
        "use": "sig",
        "crv": "P-521",
        "x": "\
            AMrF7TEaGAwudGaRq1C9hoWbMZiwFUO8I6nQQ0XDEgoYG5H2OkeTCKdF00vwidx6oLlFsg2d\
            lYGKRH1ZM8te3veG",
        "y": "\
            ARm04vD94O2PgmwhIk-Jsz8zs2qJLN41fCvaYM7XKbMycw9GQLPdQ8tu30PLP8gJE-c5kKtf\
            n4SuP7mR74lfo2B2",
        "d": "\
            AKTLqGCV8Usx2JMjdj-hGqYhbc9kXeU80BxjKj4OYD4MqhntXhNulclbfmvTRHGlxDYW4cAH\
            tY6vn-YRgh_WLxQ0",
    })
}
