//! Well-known fixture keys used by tests across the workspace.
//!
//! Golden values (fingerprints, timestamps) were derived from the key
//! material independently of this crate's parser, so parser tests
//! against them are not self-referential.

/// A real armored RSA key with a user id and a declared expiry. The key
/// expired in 2018, which makes it useful for exercising the expiry
/// check against fixed clocks.
pub const MACTOWER_PUBLIC_KEY: &str = "-----BEGIN PGP PUBLIC KEY BLOCK-----
Version: GnuPG v1

mQENBFkV2wYBCADhSKS5957Y/3NPYUO6RVYpTPScMxULQ5fR2bwIZYMvSjZ7rdPM
zlcCg7MbXvFBrzbRKebzt1tmhntBjzi0HnpPcsTslQZyOfiZ3plfiQXGZMdL83t4
g/nxP6i3+TfXafalUnr2Zp3vk9ClWyBFS1Bmzqz97w4S8uhrvMal/TklDJ+3MY8F
vsPpaOgZvCgG27vyoQnay+mVkWgC+bOFnl9tjXCSr2a1seHJpUCmJgT/qba3wVI2
NUdq9fHChY9ug1BHTFm7HvFWntRKPT+682lm3iS8kssdacxFxpheRwj6Qdk+yRQO
Ht+I8T/GtCEF0HlscYhg+7JbLnxMdYhKctTjABEBAAG0N21hY3Rvd2VyIChEZWZh
dWx0IGNvbW1lbnQgbWVzc2FnZSkgPG1hY3Rvd2VyQGVtYWlsLmNvbT6JAT4EEwEC
ACgFAlkV2wYCGy8FCQGqfjoGCwkIBwMCBhUIAgkKCwQWAgMBAh4BAheAAAoJEFWk
Wpn+ReVA4i8IAIW0JB7VEI+q0n2+exWu7uITB6OmSvJ+xadEP6sUwf02Eghppiyg
u181ZE9TpspMNscTxyv03bK9yMqbNgpNQ6LUKzD90Qlut9gl9whxCVDI78VGrCXf
YjTfG5kowCU2mIhJIpUAdb8ufvqZFYo2BnRrsj/heu9+JSYRevs+yTADo2gJGOZQ
LOm+ra8BXyw5SYAwfO+YzyuXw5ITkXppxvL2jvLf62OGNSPF3nEbS/EebJZENtw7
F0fh+9xKao+mJIX6bjAgUlIWvaqsu6W7DKeNf/flYoCnddnP06FvgjCMC9G2II9p
qVw+Ytr7XLZuvjqx84VimuK6y4+DY6shhOC5Ag0EWRXbBhAIALCVLle15qOSsQwr
0sbJ2+sN57ZzNfYOZMUqZbC9YCOPDDu54UtY2nB6oJ54PJZBGp4Fmd5oQgBYuntL
9BMj22MFgWH9Ia8RUuAImGScaGT0/BVyueeWygag0T7AuCN2Mkoed7GaA3Vv3rJf
YdBwlY6rGiIy68iWMFd4E4LCf8XTC6twufvaw0gKS4LuFLCmxEsKYIrRfYDT/MtU
b+tz+g+mxAmolGN7j7WyAdhYNNGKSh3N+AZQbBDUK0Mbrr0sdKOEJBCrN72jygGm
BfIgAkJFQ4XaG/AJ/sOgvXN3vXvzEFQrPgOVVmmVPoBOdU97kzETcEg+ZyQtOSAg
fFi20bMAAwUH/2KnoIigeKqhs8MbGGxEFJHsVxTAMxCj8A+p73+KLEtwm4DSziff
ggxnsPxEAPqwopIErB6DB2DPNVr6b4txQVIh/oe4zMhEpONi9GyTgINChNcjf7VW
Gu7So4s7y1FE2e14Xx/CsI7pICQa/FYZPmTEFOxF6vgPqnp3H2gfR7rG3FsrXZdr
mn9Aov4jCBbOBJ8Ucgfv3F0AIDs32qvuCusjYHRFggzdgtK4D92H5VidE+F0sdJK
314VtZVGcCnrvyNV/OKJ+LsKnskgGOWyYItEm5XJ8BIz1b9MBvXcGrSPPUeAonbE
6Ayl6ogjCn6l1Gn/h/JcsvawNSZLz2rYBjSJASUEGAECAA8FAlkV2wYCGwwFCQGq
fjoACgkQVaRamf5F5UCSkAgAx7gC2263ZPSTQZCJE8uJHeD9Ybik7o1/txaIICMV
vzBxIOBOSSOMVjwxJhQwkj3//WQjBmqNghlsIq5Rfwnj4bNSTrZj8pqDtoqYv1fg
WVhZv4mFF7Uw+O42Y/TC9rAU/pzvDIyUW6pLEOUMv0uUT7vqWFN8+ELGZrWQwSVL
8q6eBOhLuwq67ee4wFWc3EUh3BL1nTWfoUeJgWLJqgUIWsXK0UMhkTjuIJTRArxA
Htuy1Idq3WBJq0xL2apEfuaZTYlcbaKabieg62kseAwMsALEetBDljtUK7tkCWIS
9bB+QnZSJ1naxflAI/TtxVoLlyWRz3Mw5MxzDayjI7nYxA==
=IF8v
-----END PGP PUBLIC KEY BLOCK-----";

/// Fingerprint of [`MACTOWER_PUBLIC_KEY`].
pub const MACTOWER_FINGERPRINT: &str = "989241C552F4FD50C3475DBB55A45A99FE45E540";

/// Primary user id of [`MACTOWER_PUBLIC_KEY`].
pub const MACTOWER_USER_ID: &str = "mactower (Default comment message) <mactower@email.com>";

/// Creation time of [`MACTOWER_PUBLIC_KEY`] (2017-05-12).
pub const MACTOWER_CREATED_AT: u64 = 1_494_604_550;

/// Expiry of [`MACTOWER_PUBLIC_KEY`]: creation plus the 27 950 650
/// seconds declared in its self-signature (2018-04-01).
pub const MACTOWER_EXPIRES_AT: u64 = 1_522_555_200;

/// A fixed instant at which [`MACTOWER_PUBLIC_KEY`] is still valid.
pub const MACTOWER_VALID_AT: u64 = 1_500_000_000;

/// A fixed instant past [`MACTOWER_EXPIRES_AT`].
pub const MACTOWER_EXPIRED_AT: u64 = 1_600_000_000;

/// A synthetic RSA key with a user id and no expiry, for flows that
/// validate against the wall clock.
pub const SOTTO_FIXTURE_PUBLIC_KEY: &str = "-----BEGIN PGP PUBLIC KEY BLOCK-----
Version: GnuPG v1

mQENBFkV2wYBCACY8TXSX1VyAzAYUMWjj9VHkjpzaZTjv5EaYdviLkQVi66XupTQ
7agvj20FWE74qjiSJ2ZYHiehwIpqY+wk7eaka0yyQkoj1ZYiF76t28SWy46Blz4L
7NewOJjRkPnr2swMseKcZYzaFJXmCvWTvQTPD9Yw8fKdDamVP0jxoJ92taFwszg5
JjBZ8owQXR+xfCOQwZLP06yUrw8h3bZsrUomjRFuzhc499k9nBckEeILj2sNVJtv
A2daFgCjWgmZUNg29nXMgedO9ejiXZQO2QR1lTGYXV2dyfgYGOgRiS+QK9I/CCQS
iy8zDFx/0KajpFBlEycOJp4NN/KnTeRS5rQ5ABEBAAG0M3Rlc3R1c2VyIChTb3R0
byBmaXh0dXJlIGtleSkgPHRlc3R1c2VyQGV4YW1wbGUuY29tPg==
=dqJO
-----END PGP PUBLIC KEY BLOCK-----";

/// Fingerprint of [`SOTTO_FIXTURE_PUBLIC_KEY`].
pub const SOTTO_FIXTURE_FINGERPRINT: &str = "92881BE0F41DB1A740890D927DEEE5D437EA0974";

/// Primary user id of [`SOTTO_FIXTURE_PUBLIC_KEY`].
pub const SOTTO_FIXTURE_USER_ID: &str = "testuser (Sotto fixture key) <testuser@example.com>";
